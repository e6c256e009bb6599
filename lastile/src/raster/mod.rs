//! Imagery retrieval.
//!
//! Colorization needs an image covering a tile at a fixed ground
//! resolution. The imagery services cap the size of a single request, so
//! the covering [`PixelWindow`] is split in blocks, fetched concurrently
//! from a [`RasterSource`] and composited into a [`Mosaic`].

pub mod http;
mod mosaic;
mod source;
mod window;
mod wms;

pub use http::{AsyncHttpClient, AsyncReqwestClient, DEFAULT_TIMEOUT_SECS};
pub use mosaic::{ImageMosaicBuilder, Mosaic, MosaicConfig, NO_DATA_PIXEL};
pub use source::{is_blank, BlockRequest, FetchError, FetchOutcome, RasterSource};
pub use window::PixelWindow;
pub use wms::{decode_block, WmsSource, DEFAULT_IMAGE_FORMAT, DEFAULT_WMS_URL};

#[cfg(test)]
pub(crate) use mosaic::tests::GridSource;
#[cfg(test)]
pub(crate) use wms::tests::png_bytes;

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building a mosaic.
#[derive(Debug, Error)]
pub enum MosaicError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Every block of the mosaic came back without imagery
    #[error("layer {layer} has no imagery over the requested area")]
    NoData { layer: String },

    #[error("invalid mosaic request: {0}")]
    InvalidRequest(String),

    #[error("fetch task failed: {0}")]
    Task(String),

    #[error("cannot save mosaic to {}: {reason}", .path.display())]
    Save { path: PathBuf, reason: String },
}
