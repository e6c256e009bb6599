//! Tile-origin command - find the grid tile of a file from its points.
//!
//! Useful for files whose name does not carry their grid coordinates.

use clap::Args;
use std::path::PathBuf;

use lastile::codec::PointCloudCodec;
use lastile::TileError;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the tile-origin command.
#[derive(Debug, Args)]
pub struct TileOriginArgs {
    /// Point cloud file
    pub input: PathBuf,
}

/// Run the tile-origin command.
pub fn run(args: TileOriginArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("tile-origin");

    let grid = runner.config().grid_spec()?;
    let cloud = runner
        .codec()
        .read(&args.input)
        .map_err(TileError::from)?;
    let bounds = cloud
        .bounds()
        .ok_or_else(|| CliError::EmptyTile(args.input.clone()))?;
    let tile = grid.infer_tile_extent(&bounds).map_err(TileError::from)?;
    let (x, y) = grid.address_coordinates(&tile);

    println!("File coordinates: {} {}", x, y);
    println!(
        "Tile extent:      [{}, {}] x [{}, {}]",
        tile.xmin, tile.xmax, tile.ymin, tile.ymax
    );
    Ok(())
}
