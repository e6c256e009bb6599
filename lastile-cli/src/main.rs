//! lastile CLI - Command-line interface
//!
//! This binary provides a command-line interface to the lastile library:
//! buffering, merging, colorizing and maintaining gridded LiDAR tiles.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{
    add_buffer, clip, colorize, compare, config, dimensions, merge, occurrences,
    remove_buffer, standardize, tile_origin,
};
use error::CliError;
use runner::CliRunner;

#[derive(Debug, Parser)]
#[command(name = "lastile")]
#[command(version = lastile::VERSION)]
#[command(about = "Stitch, colorize and maintain gridded LiDAR tiles", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (default: ~/.lastile/config.ini)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Merge several files, or a tile with all its neighbors
    Merge(merge::MergeArgs),

    /// Add a buffer borrowed from the neighbor tiles
    AddBuffer(add_buffer::AddBufferArgs),

    /// Remove the buffer of a buffered tile
    RemoveBuffer(remove_buffer::RemoveBufferArgs),

    /// Color points from WMS orthoimagery
    Colorize(colorize::ColorizeArgs),

    /// Keep the points inside a 2D bounding box
    Clip(clip::ClipArgs),

    /// Rewrite a file with standard scale, offset and point format
    Standardize(standardize::StandardizeArgs),

    /// Compare the points of two files
    Compare(compare::CompareArgs),

    /// Rename dimensions
    RenameDimension(dimensions::RenameArgs),

    /// Remove dimensions
    RemoveDimension(dimensions::RemoveArgs),

    /// Count the points of each value of an integer dimension
    CountOccurrences(occurrences::CountArgs),

    /// Replace values of an integer dimension
    ReplaceOccurrences(occurrences::ReplaceArgs),

    /// Find the grid tile holding the points of a file
    TileOrigin(tile_origin::TileOriginArgs),

    /// Configuration file management
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    // Config commands must work even when the file does not parse
    if let Commands::Config(command) = cli.command {
        return config::run(command, cli.config.as_deref());
    }

    let runner = CliRunner::new(cli.config.as_deref(), cli.verbose)?;
    match cli.command {
        Commands::Merge(args) => merge::run(args, &runner),
        Commands::AddBuffer(args) => add_buffer::run(args, &runner),
        Commands::RemoveBuffer(args) => remove_buffer::run(args, &runner),
        Commands::Colorize(args) => colorize::run(args, &runner),
        Commands::Clip(args) => clip::run(args, &runner),
        Commands::Standardize(args) => standardize::run(args, &runner),
        Commands::Compare(args) => compare::run(args, &runner),
        Commands::RenameDimension(args) => dimensions::run_rename(args, &runner),
        Commands::RemoveDimension(args) => dimensions::run_remove(args, &runner),
        Commands::CountOccurrences(args) => occurrences::run_count(args, &runner),
        Commands::ReplaceOccurrences(args) => occurrences::run_replace(args, &runner),
        Commands::TileOrigin(args) => tile_origin::run(args, &runner),
        Commands::Config(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "lastile",
            "remove-buffer",
            "in.laz",
            "-o",
            "out.laz",
            "--verbose",
            "--config",
            "alt.ini",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("alt.ini")));
        assert!(matches!(cli.command, Commands::RemoveBuffer(_)));
    }

    #[test]
    fn test_subcommand_names() {
        for name in [
            "merge",
            "add-buffer",
            "remove-buffer",
            "colorize",
            "clip",
            "standardize",
            "compare",
            "rename-dimension",
            "remove-dimension",
            "count-occurrences",
            "replace-occurrences",
            "tile-origin",
            "config",
        ] {
            assert!(
                Cli::command().find_subcommand(name).is_some(),
                "missing subcommand {}",
                name
            );
        }
    }
}
