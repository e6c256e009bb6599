//! Imagery sources.

use image::RgbImage;
use std::future::Future;
use thiserror::Error;

use crate::extent::Extent;

/// One image block to fetch.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRequest {
    /// Layer name on the imagery service
    pub layer: String,
    /// Reference system of `extent`, as `EPSG:<code>`
    pub crs: String,
    pub extent: Extent,
    pub width: u32,
    pub height: u32,
}

/// Result of a successful fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Image(RgbImage),
    /// The service has no imagery over the block
    NoData,
}

/// Failure to fetch one block.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The service answered with an error document instead of an image
    #[error("service exception from {url}: {message}")]
    ServiceException { url: String, message: String },

    #[error("cannot decode image from {url}: {reason}")]
    Decode { url: String, reason: String },

    #[error("image from {url} is {actual_width}x{actual_height}, expected {width}x{height}")]
    SizeMismatch {
        url: String,
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },
}

impl FetchError {
    /// Whether trying again later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport { .. } => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Source of georeferenced image blocks.
pub trait RasterSource: Send + Sync {
    /// Fetches the image covering `request.extent` at the requested size.
    fn fetch(
        &self,
        request: &BlockRequest,
    ) -> impl Future<Output = Result<FetchOutcome, FetchError>> + Send;
}

/// Whether every pixel is pure white, the way imagery services render
/// areas they have no data for.
pub fn is_blank(image: &RgbImage) -> bool {
    image.pixels().all(|p| p.0 == [255, 255, 255])
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_is_blank() {
        let mut image = RgbImage::from_pixel(4, 4, Rgb([255, 255, 255]));
        assert!(is_blank(&image));
        image.put_pixel(3, 3, Rgb([255, 254, 255]));
        assert!(!is_blank(&image));
    }

    #[test]
    fn test_retryable_errors() {
        let url = "https://example.com".to_string();
        assert!(FetchError::Status { url: url.clone(), status: 503 }.is_retryable());
        assert!(FetchError::Status { url: url.clone(), status: 429 }.is_retryable());
        assert!(!FetchError::Status { url: url.clone(), status: 404 }.is_retryable());
        assert!(!FetchError::ServiceException {
            url,
            message: "LayerNotDefined".to_string()
        }
        .is_retryable());
    }
}
