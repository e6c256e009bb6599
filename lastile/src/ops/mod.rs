//! Single-file maintenance operations.
//!
//! Each operation has an in-memory form working on a [`PointCloud`] and a
//! file-level form reading and writing through a codec.
//!
//! [`PointCloud`]: crate::cloud::PointCloud

mod clip;
mod compare;
mod dimensions;
mod occurrences;
mod standardize;

pub use clip::{checked_bounds, clip, clip_file, ClipSummary};
pub use compare::{compare, compare_files, CompareOptions, Comparison, Mismatch};
pub use dimensions::{
    remove_dimensions, remove_dimensions_file, rename_dimensions, rename_dimensions_file,
};
pub use occurrences::{
    count_files, count_occurrences, merge_count_files, replace_occurrences,
    replace_occurrences_file, OccurrenceCounts, ReplacementMap,
};
pub use standardize::{standardize, standardize_file, STANDARD_FORMATS};

use std::path::PathBuf;
use thiserror::Error;

use crate::cloud::ValueKind;
use crate::extent::Extent;

/// Errors raised by the maintenance operations.
#[derive(Debug, Error)]
pub enum OpsError {
    /// X, Y and Z cannot be renamed, removed or overwritten
    #[error("dimension {0} is mandatory")]
    MandatoryDimension(String),

    #[error("dimension {0} not found")]
    UnknownDimension(String),

    #[error("dimension {0} already exists")]
    DimensionExists(String),

    #[error("dimension {dimension} is stored as {kind}, {target} requires {required}")]
    KindMismatch {
        dimension: String,
        target: String,
        kind: ValueKind,
        required: ValueKind,
    },

    #[error("{old} dimensions to rename but {new} new names")]
    RenameArity { old: usize, new: usize },

    #[error("dimension {dimension} holds {kind} values, not integers")]
    NotInteger { dimension: String, kind: ValueKind },

    /// A value is listed as the source of several replacements
    #[error("value {value} is listed {count} times in the replacement map")]
    DuplicateSource { value: i64, count: usize },

    #[error("value {value} does not fit in {dimension}")]
    ValueOutOfRange { dimension: String, value: i64 },

    #[error(
        "invalid clip bounds ({}, {}) to ({}, {}): expected finite values with min <= max",
        .0.xmin, .0.ymin, .0.xmax, .0.ymax
    )]
    InvalidBounds(Extent),

    #[error("unsupported point format {0}: expected one of 6, 8")]
    UnsupportedFormat(u8),

    #[error("invalid JSON in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Whether `name` is one of the coordinate dimensions.
pub(crate) fn is_coordinate(name: &str) -> bool {
    crate::cloud::COORDINATE_NAMES
        .iter()
        .any(|c| c.eq_ignore_ascii_case(name))
}
