//! Buffer assembly: a tile plus a margin of points borrowed from its
//! neighbors.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::BufferError;
use crate::cloud::{PointCloud, Provenance};
use crate::extent::{Extent, Sides};
use crate::grid::Direction;

/// Result of [`assemble`].
#[derive(Debug, Clone, PartialEq)]
pub struct BufferedTile {
    /// Tile points followed by buffer points, buffer-marked
    pub cloud: PointCloud,
    /// Tile extent grown on the sides touched by a present neighbor
    pub extent: Extent,
    /// Number of points taken from each present neighbor
    pub contributions: Vec<(Direction, usize)>,
}

impl BufferedTile {
    /// Number of points borrowed from neighbors.
    pub fn buffer_points(&self) -> usize {
        self.contributions.iter().map(|(_, n)| n).sum()
    }
}

/// Checks a buffer distance against the tile size.
///
/// Negative and non-finite distances are rejected. A distance wider than
/// the tile would reach beyond the direct neighbors, so it is clamped to the
/// tile size with a warning.
pub fn checked_distance(distance: f64, tile: &Extent) -> Result<f64, BufferError> {
    if !distance.is_finite() || distance < 0.0 {
        return Err(BufferError::InvalidBufferDistance(distance));
    }

    let limit = tile.width().min(tile.height());
    if limit > 0.0 && distance > limit {
        warn!(
            requested = distance,
            clamped = limit,
            "Buffer distance exceeds the tile size, clamping"
        );
        return Ok(limit);
    }
    Ok(distance)
}

/// Points of `cloud` inside `area` (inclusive).
pub fn crop(mut cloud: PointCloud, area: &Extent) -> PointCloud {
    cloud.retain(|p| area.contains(p.x, p.y));
    cloud
}

/// Builds the buffered version of a tile.
///
/// The output keeps the schema and header of `center`: neighbor points are
/// conformed to it, dimensions missing from a neighbor take their default
/// value. Center points come first, then neighbor points in [`Direction`]
/// order. A neighbor with no point inside the margin contributes nothing
/// but still widens the extent, since its presence proves the coverage
/// continues on that side.
pub fn assemble(
    center: PointCloud,
    center_extent: Extent,
    neighbors: BTreeMap<Direction, PointCloud>,
    buffer_distance: f64,
) -> Result<BufferedTile, BufferError> {
    let distance = checked_distance(buffer_distance, &center_extent)?;
    let margin = center_extent.expand(distance);
    let schema = center.schema().clone();

    let tile_points = center.len();
    let mut tile = PointCloud::with_header(center.header().clone(), schema.clone());
    tile.extend_aligned(center.into_points().into_iter().map(|mut p| {
        p.provenance = Provenance::Tile;
        p
    }));

    let mut sides = Sides::default();
    let mut contributions = Vec::with_capacity(neighbors.len());
    for (direction, neighbor) in neighbors {
        sides = sides.union(direction.sides());

        let borrowed = crop(neighbor.conform_to(&schema)?, &margin);
        if borrowed.is_empty() {
            debug!(%direction, "Neighbor has no point in the buffer margin");
        }
        contributions.push((direction, borrowed.len()));
        tile.extend_aligned(borrowed.into_points().into_iter().map(|mut p| {
            p.provenance = Provenance::Buffer;
            p
        }));
    }
    tile.set_buffer_marked(true);

    let extent = center_extent.expand_sides(sides, distance);
    debug!(
        tile_points,
        buffer_points = tile.len() - tile_points,
        neighbors = contributions.len(),
        "Assembled buffered tile"
    );

    Ok(BufferedTile {
        cloud: tile,
        extent,
        contributions,
    })
}
