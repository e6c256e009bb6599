//! Standardize command - rewrite a file in the standard delivery layout.
//!
//! The output is a compressed LAS 1.4 file in point format 6 or 8, with
//! 0.01 scales, an offset at the floor of the minimum coordinates and no
//! extra dimension.

use clap::Args;
use std::path::PathBuf;

use lastile::ops::{standardize_file, STANDARD_FORMATS};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the standardize command.
#[derive(Debug, Args)]
pub struct StandardizeArgs {
    /// File to standardize
    pub input: PathBuf,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Point format: 6 (no color) or 8 (RGB and infrared)
    #[arg(short, long, default_value_t = 6, value_parser = parse_format)]
    pub format: u8,
}

fn parse_format(s: &str) -> Result<u8, String> {
    let format: u8 = s
        .parse()
        .map_err(|_| format!("'{}' is not a point format", s))?;
    if STANDARD_FORMATS.contains(&format) {
        Ok(format)
    } else {
        Err(format!("point format must be one of {:?}", STANDARD_FORMATS))
    }
}

/// Run the standardize command.
pub fn run(args: StandardizeArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("standardize");

    let points = standardize_file(&args.input, &args.output, args.format, runner.codec())?;

    println!(
        "Standardized {} points (format {}): {}",
        points,
        args.format,
        args.output.display()
    );
    Ok(())
}
