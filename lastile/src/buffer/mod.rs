//! Tile buffering.
//!
//! A buffered tile is a tile plus the points of its neighbors lying within
//! a margin around it, so that neighborhood-sensitive processing (surface
//! interpolation, classification) sees no artificial edge. Every point keeps
//! its provenance, which allows [`strip`] to restore the tile afterwards.

mod assemble;
mod strip;

pub use assemble::{assemble, checked_distance, crop, BufferedTile};
pub use strip::{strip, MissingBufferMarkError};

use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;
use tracing::{info, instrument, warn};

use crate::cloud::SchemaConflictError;
use crate::codec::{PointCloudCodec, WriteOptions};
use crate::config::DEFAULT_BUFFER_DISTANCE;
use crate::error::TileError;
use crate::extent::Extent;
use crate::grid::{neighbors, Direction, GridSpec, TileAddress, TileSet};

/// Errors raised by buffer assembly.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BufferError {
    /// The buffer distance is negative or not a number
    #[error("invalid buffer distance {0}: expected a finite, non-negative value")]
    InvalidBufferDistance(f64),

    /// A neighbor defines a dimension of the tile with another type
    #[error(transparent)]
    SchemaConflict(#[from] SchemaConflictError),
}

/// Buffer settings.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferConfig {
    distance: f64,
    grid: GridSpec,
}

impl BufferConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the width of the margin, in ground units.
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_grid(mut self, grid: GridSpec) -> Self {
        self.grid = grid;
        self
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            distance: DEFAULT_BUFFER_DISTANCE,
            grid: GridSpec::default(),
        }
    }
}

/// Outcome of [`add_buffer`].
#[derive(Debug, Clone, PartialEq)]
pub struct BufferSummary {
    pub tile_points: usize,
    pub buffer_points: usize,
    pub neighbors: Vec<Direction>,
    pub extent: Extent,
}

/// Outcome of [`remove_buffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripSummary {
    pub kept: usize,
    pub removed: usize,
}

/// Writes the buffered version of `tile` to `output`.
///
/// Neighbors are looked up in `tiles` from the tile file name. Each
/// neighbor is cropped to the margin right after being read, so that at
/// most one full neighbor is held in memory.
#[instrument(level = "debug", skip_all, fields(tile = %tile.display()))]
pub fn add_buffer<C: PointCloudCodec + ?Sized>(
    tile: &Path,
    tiles: &TileSet,
    config: &BufferConfig,
    output: &Path,
    codec: &C,
    options: &WriteOptions,
) -> Result<BufferSummary, TileError> {
    let address = TileAddress::parse(tile)?;
    let center_extent = config.grid().tile_extent(&address);
    let distance = checked_distance(config.distance(), &center_extent)?;
    let margin = center_extent.expand(distance);

    let center = codec.read(tile)?;
    let tile_points = center.len();

    let mut borrowed = BTreeMap::new();
    for neighbor in neighbors(&address, config.grid(), tiles) {
        let cropped = crop(codec.read(&neighbor.path)?, &margin);
        if cropped.is_empty() {
            warn!(
                neighbor = %neighbor.path.display(),
                "Neighbor ignored: no points in the buffer margin"
            );
        }
        borrowed.insert(neighbor.direction, cropped);
    }

    let buffered = assemble(center, center_extent, borrowed, distance)?;
    codec.write(&buffered.cloud, output, options)?;

    let summary = BufferSummary {
        tile_points,
        buffer_points: buffered.buffer_points(),
        neighbors: buffered.contributions.iter().map(|(d, _)| *d).collect(),
        extent: buffered.extent,
    };
    info!(
        tile = %address,
        output = %output.display(),
        tile_points = summary.tile_points,
        buffer_points = summary.buffer_points,
        neighbors = summary.neighbors.len(),
        "Added buffer"
    );
    Ok(summary)
}

/// Writes `input` without its buffer points to `output`.
#[instrument(level = "debug", skip_all, fields(input = %input.display()))]
pub fn remove_buffer<C: PointCloudCodec + ?Sized>(
    input: &Path,
    output: &Path,
    codec: &C,
    options: &WriteOptions,
) -> Result<StripSummary, TileError> {
    let cloud = codec.read(input)?;
    let total = cloud.len();
    let stripped = strip(cloud)?;
    codec.write(&stripped, output, options)?;

    let summary = StripSummary {
        kept: stripped.len(),
        removed: total - stripped.len(),
    };
    info!(
        output = %output.display(),
        kept = summary.kept,
        removed = summary.removed,
        "Removed buffer"
    );
    Ok(summary)
}
