//! Rename-dimension and remove-dimension commands.

use clap::Args;
use std::path::PathBuf;

use lastile::ops::{remove_dimensions_file, rename_dimensions_file};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the rename-dimension command.
#[derive(Debug, Args)]
pub struct RenameArgs {
    /// Input file
    pub input: PathBuf,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Dimensions to rename
    #[arg(long, num_args = 1.., required = true)]
    pub old: Vec<String>,

    /// New names, in the same order
    #[arg(long, num_args = 1.., required = true)]
    pub new: Vec<String>,
}

/// Arguments for the remove-dimension command.
#[derive(Debug, Args)]
pub struct RemoveArgs {
    /// Input file
    pub input: PathBuf,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Dimensions to remove
    #[arg(long, value_delimiter = ',', required = true, value_name = "NAMES")]
    pub dimensions: Vec<String>,
}

/// Run the rename-dimension command.
pub fn run_rename(args: RenameArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("rename-dimension");

    rename_dimensions_file(
        &args.input,
        &args.output,
        &args.old,
        &args.new,
        runner.codec(),
        &runner.write_options(),
    )?;

    for (old, new) in args.old.iter().zip(&args.new) {
        println!("  {} -> {}", old, new);
    }
    println!("Written to {}", args.output.display());
    Ok(())
}

/// Run the remove-dimension command.
pub fn run_remove(args: RemoveArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("remove-dimension");

    let removed = remove_dimensions_file(
        &args.input,
        &args.output,
        &args.dimensions,
        runner.codec(),
        &runner.write_options(),
    )?;

    if removed.is_empty() {
        println!("No dimension removed");
    } else {
        println!("Removed {}", removed.join(", "));
    }
    println!("Written to {}", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct RenameCli {
        #[command(flatten)]
        args: RenameArgs,
    }

    #[derive(Debug, Parser)]
    struct RemoveCli {
        #[command(flatten)]
        args: RemoveArgs,
    }

    #[test]
    fn test_parse_rename() {
        let cli = RenameCli::try_parse_from([
            "rename-dimension",
            "in.laz",
            "-o",
            "out.laz",
            "--old",
            "a",
            "b",
            "--new",
            "c",
            "d",
        ])
        .unwrap();
        assert_eq!(cli.args.old, vec!["a", "b"]);
        assert_eq!(cli.args.new, vec!["c", "d"]);
    }

    #[test]
    fn test_parse_remove() {
        let cli = RemoveCli::try_parse_from([
            "remove-dimension",
            "in.laz",
            "-o",
            "out.laz",
            "--dimensions",
            "height,Infrared",
        ])
        .unwrap();
        assert_eq!(cli.args.dimensions, vec!["height", "Infrared"]);
        assert!(
            RemoveCli::try_parse_from(["remove-dimension", "in.laz", "-o", "out.laz"]).is_err()
        );
    }
}
