//! Concatenation of point clouds.

use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use crate::cloud::{CloudHeader, PointCloud, SchemaConflictError};
use crate::codec::{PointCloudCodec, WriteOptions};
use crate::error::TileError;
use crate::grid::{neighbors, GridSpec, TileAddress, TileSet};

/// Which header the merged cloud carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum HeaderPolicy {
    /// Scale, offset and CRS of the first input
    #[default]
    Primary,
    /// An explicit header
    Override(CloudHeader),
}

/// Concatenates clouds in input order.
///
/// The schema is the union of the input schemas, in order of first
/// appearance; points lacking a dimension get its default value. The same
/// dimension stored with two different types is a conflict. The result is
/// buffer-marked when any input is. Merging nothing gives an empty cloud.
pub fn merge(
    clouds: Vec<PointCloud>,
    policy: &HeaderPolicy,
) -> Result<PointCloud, SchemaConflictError> {
    let mut schema = match clouds.first() {
        Some(first) => first.schema().clone(),
        None => Default::default(),
    };
    for cloud in clouds.iter().skip(1) {
        schema = schema.union(cloud.schema())?;
    }

    let header = match policy {
        HeaderPolicy::Override(header) => header.clone(),
        HeaderPolicy::Primary => clouds
            .first()
            .map(|c| c.header().clone())
            .unwrap_or_default(),
    };
    let buffer_marked = clouds.iter().any(PointCloud::is_buffer_marked);
    let total: usize = clouds.iter().map(PointCloud::len).sum();

    let mut merged = PointCloud::with_header(header, schema.clone());
    for cloud in clouds {
        let aligned = cloud.conform_to(&schema)?;
        merged.extend_aligned(aligned.into_points());
    }
    merged.set_buffer_marked(buffer_marked);

    debug!(points = total, dimensions = schema.len(), "Merged clouds");
    Ok(merged)
}

/// Merges files into `output`. Returns the number of points written.
#[instrument(level = "debug", skip_all, fields(inputs = inputs.len()))]
pub fn merge_files<C: PointCloudCodec + ?Sized>(
    inputs: &[PathBuf],
    output: &Path,
    policy: &HeaderPolicy,
    codec: &C,
    options: &WriteOptions,
) -> Result<usize, TileError> {
    let clouds = inputs
        .iter()
        .map(|path| codec.read(path))
        .collect::<Result<Vec<_>, _>>()?;
    let merged = merge(clouds, policy)?;
    codec.write(&merged, output, options)?;

    info!(
        output = %output.display(),
        inputs = inputs.len(),
        points = merged.len(),
        "Merged files"
    );
    Ok(merged.len())
}

/// Merges a tile with every neighbor present in `tiles`, without cropping.
///
/// The header of the tile is kept. Returns the paths that were merged,
/// the tile first.
#[instrument(level = "debug", skip_all, fields(tile = %tile.display()))]
pub fn merge_neighborhood<C: PointCloudCodec + ?Sized>(
    tile: &Path,
    tiles: &TileSet,
    grid: &GridSpec,
    output: &Path,
    codec: &C,
    options: &WriteOptions,
) -> Result<Vec<PathBuf>, TileError> {
    let address = TileAddress::parse(tile)?;
    let mut inputs = vec![tile.to_path_buf()];
    inputs.extend(
        neighbors(&address, grid, tiles)
            .into_iter()
            .map(|n| n.path),
    );

    merge_files(&inputs, output, &HeaderPolicy::Primary, codec, options)?;
    Ok(inputs)
}
