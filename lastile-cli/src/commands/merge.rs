//! Merge command - concatenate files or a tile with its neighbors.

use clap::Args;
use std::path::PathBuf;

use lastile::merge::{merge_files, merge_neighborhood, HeaderPolicy};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the merge command.
#[derive(Debug, Args)]
pub struct MergeArgs {
    /// Files to merge, in order; the first one gives the header
    #[arg(
        short,
        long = "input",
        num_args = 1..,
        required_unless_present = "neighbors",
        conflicts_with = "neighbors"
    )]
    pub inputs: Vec<PathBuf>,

    /// Merge this tile with every neighbor found next to it
    #[arg(long, value_name = "TILE")]
    pub neighbors: Option<PathBuf>,

    /// Directory holding the neighbors (default: the directory of the tile)
    #[arg(long, value_name = "DIR", requires = "neighbors")]
    pub tile_dir: Option<PathBuf>,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Run the merge command.
pub fn run(args: MergeArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("merge");
    let options = runner.write_options();

    match args.neighbors {
        Some(tile) => {
            let tiles = runner.tile_set(&tile, args.tile_dir.as_deref())?;
            let grid = runner.config().grid_spec()?;
            let merged = merge_neighborhood(
                &tile,
                &tiles,
                &grid,
                &args.output,
                runner.codec(),
                &options,
            )?;
            println!(
                "Merged {} with {} neighbors into {}",
                tile.display(),
                merged.len() - 1,
                args.output.display()
            );
        }
        None => {
            let points = merge_files(
                &args.inputs,
                &args.output,
                &HeaderPolicy::Primary,
                runner.codec(),
                &options,
            )?;
            println!(
                "Merged {} files ({} points) into {}",
                args.inputs.len(),
                points,
                args.output.display()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        args: MergeArgs,
    }

    #[test]
    fn test_parse_inputs() {
        let cli =
            TestCli::try_parse_from(["merge", "-i", "a.laz", "b.laz", "-o", "out.laz"]).unwrap();
        assert_eq!(
            cli.args.inputs,
            vec![PathBuf::from("a.laz"), PathBuf::from("b.laz")]
        );
        assert!(cli.args.neighbors.is_none());
    }

    #[test]
    fn test_parse_neighbors() {
        let cli = TestCli::try_parse_from([
            "merge",
            "--neighbors",
            "Semis_2021_0770_6278_LA93_IGN69.laz",
            "-o",
            "out.laz",
        ])
        .unwrap();
        assert!(cli.args.inputs.is_empty());
        assert!(cli.args.neighbors.is_some());
    }

    #[test]
    fn test_inputs_or_neighbors_required() {
        assert!(TestCli::try_parse_from(["merge", "-o", "out.laz"]).is_err());
        assert!(TestCli::try_parse_from([
            "merge",
            "-i",
            "a.laz",
            "--neighbors",
            "b.laz",
            "-o",
            "out.laz"
        ])
        .is_err());
    }
}
