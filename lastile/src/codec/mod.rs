//! Point cloud file codecs.
//!
//! The [`PointCloudCodec`] trait is the seam between the tile operations and
//! the file format. [`LasCodec`] reads and writes LAS/LAZ files through the
//! `las` crate; [`MemoryCodec`] keeps clouds in memory for tests and dry
//! runs.

mod extra_bytes;
mod las_codec;
mod memory;
pub mod srs;

pub use extra_bytes::{ExtraField, EXTRA_BYTES_RECORD_ID, EXTRA_BYTES_USER_ID};
pub use las_codec::LasCodec;
pub use memory::MemoryCodec;

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cloud::{Dimension, PointCloud};

/// Name of the extra dimension holding the buffer provenance flag.
pub const BUFFER_MARK_DIMENSION: &str = "is_in_original";

/// Errors raised while reading or writing point cloud files.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The LAS reader rejected the file
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: las::Error,
    },

    /// The LAS writer rejected the cloud
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: las::Error,
    },

    /// File system error
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The cloud cannot be represented in the requested format
    #[error("cannot encode {}: {reason}", .path.display())]
    Unsupported { path: PathBuf, reason: String },
}

impl CodecError {
    /// Path of the file involved.
    pub fn path(&self) -> &Path {
        match self {
            CodecError::Read { path, .. }
            | CodecError::Write { path, .. }
            | CodecError::Io { path, .. }
            | CodecError::Unsupported { path, .. } => path,
        }
    }
}

/// Options for writing a cloud.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteOptions {
    /// LAS point format, chosen from the attributes when `None`
    pub point_format: Option<u8>,
    /// LAZ compression, derived from the file extension when `None`
    pub compress: Option<bool>,
    /// Software name stored in the header
    pub generating_software: Option<String>,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_point_format(mut self, format: u8) -> Self {
        self.point_format = Some(format);
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = Some(compress);
        self
    }

    /// Whether the output at `path` is compressed.
    pub fn compresses(&self, path: &Path) -> bool {
        self.compress.unwrap_or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.eq_ignore_ascii_case("laz"))
                .unwrap_or(false)
        })
    }
}

/// Reads and writes point clouds.
pub trait PointCloudCodec: Send + Sync {
    /// Reads a whole file.
    fn read(&self, path: &Path) -> Result<PointCloud, CodecError>;

    /// Writes a cloud, replacing any existing file.
    ///
    /// A failed write leaves no partial file at `path`.
    fn write(&self, cloud: &PointCloud, path: &Path, options: &WriteOptions)
        -> Result<(), CodecError>;
}

/// Smallest LAS 1.4 point format able to hold the attributes of a cloud.
pub fn auto_point_format(cloud: &PointCloud) -> u8 {
    let schema = cloud.schema();
    if schema.contains(&Dimension::Infrared) {
        8
    } else if [Dimension::Red, Dimension::Green, Dimension::Blue]
        .iter()
        .any(|d| schema.contains(d))
    {
        7
    } else {
        6
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::{DimensionDef, Schema};

    #[test]
    fn test_auto_point_format() {
        let mut cloud = PointCloud::new(Schema::native(&[Dimension::Intensity]));
        assert_eq!(auto_point_format(&cloud), 6);
        cloud.add_dimension(DimensionDef::native(Dimension::Green)).unwrap();
        assert_eq!(auto_point_format(&cloud), 7);
        cloud.add_dimension(DimensionDef::native(Dimension::Infrared)).unwrap();
        assert_eq!(auto_point_format(&cloud), 8);
    }

    #[test]
    fn test_compression_from_extension() {
        let options = WriteOptions::new();
        assert!(options.compresses(Path::new("tile.LAZ")));
        assert!(!options.compresses(Path::new("tile.las")));
        assert!(!WriteOptions::new()
            .with_compression(false)
            .compresses(Path::new("tile.laz")));
    }

    #[test]
    fn test_error_reports_path() {
        let err = CodecError::Unsupported {
            path: PathBuf::from("/tmp/out.las"),
            reason: "too many extra bytes".to_string(),
        };
        assert_eq!(err.path(), Path::new("/tmp/out.las"));
        assert!(err.to_string().contains("/tmp/out.las"));
    }
}
