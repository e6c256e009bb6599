//! Count-occurrences and replace-occurrences commands.
//!
//! Counts are JSON objects mapping each value to its number of points, e.g.
//! `{"1": 1200, "2": 845}`. Counts of several runs can be summed with
//! `count-occurrences --merge`.

use clap::Args;
use std::path::PathBuf;

use lastile::cloud::Dimension;
use lastile::ops::{count_files, merge_count_files, replace_occurrences_file, ReplacementMap};
use lastile::TileError;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the count-occurrences command.
#[derive(Debug, Args)]
pub struct CountArgs {
    /// Point cloud files, or JSON count files with --merge
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Integer dimension to count
    #[arg(long, default_value = "Classification")]
    pub dimension: String,

    /// Sum JSON count files instead of reading point clouds
    #[arg(long)]
    pub merge: bool,

    /// JSON output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the replace-occurrences command.
#[derive(Debug, Args)]
pub struct ReplaceArgs {
    /// Input file
    pub input: PathBuf,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Integer dimension to modify
    #[arg(long, default_value = "Classification")]
    pub dimension: String,

    /// JSON file mapping each new value to the values it replaces,
    /// e.g. {"1": [2, 3], "6": [64]}
    #[arg(long, value_name = "FILE")]
    pub map: PathBuf,
}

/// Run the count-occurrences command.
pub fn run_count(args: CountArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("count-occurrences");

    let counts = if args.merge {
        merge_count_files(&args.inputs).map_err(TileError::from)?
    } else {
        let dimension = Dimension::from_name(&args.dimension);
        count_files(&args.inputs, &dimension, runner.codec())?
    };

    match args.output {
        Some(path) => {
            counts.save(&path).map_err(TileError::from)?;
            println!(
                "Counted {} points over {} values: {}",
                counts.total(),
                counts.len(),
                path.display()
            );
        }
        None => {
            let json = counts
                .to_json()
                .map_err(|e| CliError::Serialize(e.to_string()))?;
            println!("{}", json);
        }
    }
    Ok(())
}

/// Run the replace-occurrences command.
pub fn run_replace(args: ReplaceArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("replace-occurrences");

    let map = ReplacementMap::load(&args.map).map_err(TileError::from)?;
    let dimension = Dimension::from_name(&args.dimension);
    let changed = replace_occurrences_file(
        &args.input,
        &args.output,
        &dimension,
        &map,
        runner.codec(),
        &runner.write_options(),
    )?;

    println!(
        "Replaced {} {} values: {}",
        changed,
        dimension.name(),
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct CountCli {
        #[command(flatten)]
        args: CountArgs,
    }

    #[derive(Debug, Parser)]
    struct ReplaceCli {
        #[command(flatten)]
        args: ReplaceArgs,
    }

    #[test]
    fn test_count_defaults_to_classification() {
        let cli = CountCli::try_parse_from(["count-occurrences", "a.laz", "b.laz"]).unwrap();
        assert_eq!(cli.args.dimension, "Classification");
        assert_eq!(cli.args.inputs.len(), 2);
        assert!(!cli.args.merge);
        assert!(cli.args.output.is_none());
    }

    #[test]
    fn test_count_requires_input() {
        assert!(CountCli::try_parse_from(["count-occurrences"]).is_err());
    }

    #[test]
    fn test_replace_requires_map() {
        assert!(
            ReplaceCli::try_parse_from(["replace-occurrences", "in.laz", "-o", "out.laz"]).is_err()
        );
        let cli = ReplaceCli::try_parse_from([
            "replace-occurrences",
            "in.laz",
            "-o",
            "out.laz",
            "--map",
            "map.json",
        ])
        .unwrap();
        assert_eq!(cli.args.map, PathBuf::from("map.json"));
    }
}
