//! Add-buffer command - borrow a margin of points from the neighbor tiles.
//!
//! Works on a single tile, or on every tile of a directory with `--all`,
//! in which case `--output` is a directory and each buffered tile keeps
//! its file name.

use clap::Args;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::error;

use lastile::batch::add_buffer_all;
use lastile::buffer::{add_buffer, BufferConfig};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the add-buffer command.
#[derive(Debug, Args)]
pub struct AddBufferArgs {
    /// Tile to buffer
    #[arg(required_unless_present = "all", conflicts_with = "all")]
    pub tile: Option<PathBuf>,

    /// Buffer every tile of this directory
    #[arg(long, value_name = "DIR")]
    pub all: Option<PathBuf>,

    /// Directory holding the neighbors (default: the directory of the tile)
    #[arg(long, value_name = "DIR", conflicts_with = "all")]
    pub tile_dir: Option<PathBuf>,

    /// Buffer width in ground units (default: from config)
    #[arg(short, long)]
    pub distance: Option<f64>,

    /// Output file, or output directory with --all
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Run the add-buffer command.
pub fn run(args: AddBufferArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("add-buffer");

    let mut config = runner.config().buffer_config()?;
    if let Some(distance) = args.distance {
        config = config.with_distance(distance);
    }

    match (args.tile, args.all) {
        (_, Some(dir)) => run_all(&dir, &args.output, &config, runner),
        (Some(tile), None) => run_single(
            &tile,
            args.tile_dir.as_deref(),
            &args.output,
            &config,
            runner,
        ),
        (None, None) => Err(CliError::Config(
            "a tile or --all <DIR> is required".to_string(),
        )),
    }
}

fn run_single(
    tile: &Path,
    tile_dir: Option<&Path>,
    output: &Path,
    config: &BufferConfig,
    runner: &CliRunner,
) -> Result<(), CliError> {
    let tiles = runner.tile_set(tile, tile_dir)?;
    let summary = add_buffer(
        tile,
        &tiles,
        config,
        output,
        runner.codec(),
        &runner.write_options(),
    )?;

    println!("Buffered tile written to {}", output.display());
    println!("  Tile points:   {}", summary.tile_points);
    println!("  Buffer points: {}", summary.buffer_points);
    println!("  Neighbors:     {}", summary.neighbors.len());
    println!(
        "  Extent:        [{}, {}] x [{}, {}]",
        summary.extent.xmin, summary.extent.xmax, summary.extent.ymin, summary.extent.ymax
    );
    Ok(())
}

fn run_all(
    dir: &Path,
    output_dir: &Path,
    config: &BufferConfig,
    runner: &CliRunner,
) -> Result<(), CliError> {
    if same_directory(dir, output_dir) {
        return Err(CliError::Config(
            "the output directory must differ from the tile directory".to_string(),
        ));
    }
    fs::create_dir_all(output_dir).map_err(|error| CliError::Io {
        path: output_dir.to_path_buf(),
        error,
    })?;

    let tiles = runner.tile_set(dir, Some(dir))?;
    println!("Buffering {} tiles from {}...", tiles.len(), dir.display());

    let report = add_buffer_all(
        &tiles,
        config,
        output_dir,
        runner.codec(),
        &runner.write_options(),
    );

    for (path, e) in report.failures() {
        error!(tile = %path.display(), error = %e, "Tile failed");
        println!("  ✗ {}: {}", path.display(), e);
    }
    println!();
    println!("  Succeeded: {}", report.succeeded());
    println!("  Skipped:   {}", report.skipped() + tiles.skipped().len());
    println!("  Failed:    {}", report.failed());

    if report.is_success() {
        Ok(())
    } else {
        Err(CliError::BatchFailed {
            failed: report.failed(),
            total: report.outcomes.len(),
        })
    }
}

/// Whether both paths name the same existing directory.
fn same_directory(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        args: AddBufferArgs,
    }

    #[test]
    fn test_parse_single_tile() {
        let cli = TestCli::try_parse_from([
            "add-buffer",
            "Semis_2021_0770_6278_LA93_IGN69.laz",
            "-d",
            "20",
            "-o",
            "buffered.laz",
        ])
        .unwrap();
        assert_eq!(cli.args.distance, Some(20.0));
        assert!(cli.args.all.is_none());
    }

    #[test]
    fn test_parse_all() {
        let cli =
            TestCli::try_parse_from(["add-buffer", "--all", "tiles", "-o", "buffered"]).unwrap();
        assert_eq!(cli.args.all, Some(PathBuf::from("tiles")));
        assert!(cli.args.tile.is_none());
    }

    #[test]
    fn test_tile_and_all_conflict() {
        assert!(
            TestCli::try_parse_from(["add-buffer", "a.laz", "--all", "tiles", "-o", "x"]).is_err()
        );
        assert!(TestCli::try_parse_from(["add-buffer", "-o", "x"]).is_err());
    }

    #[test]
    fn test_same_directory() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("out");
        fs::create_dir(&nested).unwrap();

        assert!(same_directory(temp_dir.path(), &nested.join("..")));
        assert!(!same_directory(temp_dir.path(), &nested));
        assert!(!same_directory(temp_dir.path(), &temp_dir.path().join("missing")));
    }
}
