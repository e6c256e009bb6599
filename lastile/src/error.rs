//! Crate-level error type.
//!
//! Each module has its own error enum; [`TileError`] gathers them for the
//! file-level operations and the per-tile outcomes of batch runs.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::buffer::{BufferError, MissingBufferMarkError};
use crate::cloud::SchemaConflictError;
use crate::codec::CodecError;
use crate::color::ColorError;
use crate::grid::{GridError, ParseError};
use crate::ops::OpsError;
use crate::raster::MosaicError;

/// Error of a tile-level operation.
#[derive(Debug, Error)]
pub enum TileError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Grid(#[from] GridError),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    SchemaConflict(#[from] SchemaConflictError),

    #[error(transparent)]
    MissingBufferMark(#[from] MissingBufferMarkError),

    #[error(transparent)]
    Buffer(#[from] BufferError),

    #[error(transparent)]
    Mosaic(#[from] MosaicError),

    #[error(transparent)]
    Color(#[from] ColorError),

    #[error(transparent)]
    Ops(#[from] OpsError),

    /// File system error outside of the codec
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl TileError {
    /// Whether the error only concerns the input naming, in which case batch
    /// runs skip the file rather than report a failure.
    pub fn is_skippable(&self) -> bool {
        matches!(self, TileError::Parse(_))
    }
}
