//! Compare command - check that two files hold the same points.
//!
//! Exits with an error when the files differ, so that the command can be
//! used in scripts.

use clap::Args;
use std::path::PathBuf;

use lastile::ops::{compare_files, CompareOptions, Mismatch};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the compare command.
#[derive(Debug, Args)]
pub struct CompareArgs {
    /// First file
    pub left: PathBuf,

    /// Second file
    pub right: PathBuf,

    /// Dimensions to compare (default: all, which must then match)
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    pub dimensions: Option<Vec<String>>,

    /// Allowed absolute difference for a dimension, e.g. Z=0.01
    #[arg(long, value_name = "NAME=VALUE", value_parser = parse_tolerance)]
    pub tolerance: Vec<(String, f64)>,
}

fn parse_tolerance(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", s))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a number", value))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("tolerance of {} must be a non-negative number", name));
    }
    Ok((name.trim().to_string(), value))
}

/// Run the compare command.
pub fn run(args: CompareArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("compare");

    let mut options = CompareOptions::new();
    if let Some(dimensions) = args.dimensions {
        options = options.with_dimensions(dimensions);
    }
    for (name, tolerance) in args.tolerance {
        options = options.with_tolerance(name, tolerance);
    }

    let comparison = compare_files(&args.left, &args.right, &options, runner.codec())?;

    match &comparison.mismatch {
        Some(Mismatch::PointCount { left, right }) => {
            println!("Point counts differ: {} vs {}", left, right);
        }
        Some(Mismatch::Dimensions {
            only_left,
            only_right,
        }) => {
            println!("Dimensions differ");
            if !only_left.is_empty() {
                println!("  Only in {}: {}", args.left.display(), only_left.join(", "));
            }
            if !only_right.is_empty() {
                println!("  Only in {}: {}", args.right.display(), only_right.join(", "));
            }
        }
        Some(Mismatch::MissingDimension(name)) => {
            println!("Dimension {} is missing from one of the files", name);
        }
        None => {}
    }

    if comparison.identical {
        println!("✓ Files are identical");
        Ok(())
    } else {
        Err(CliError::FilesDiffer {
            differing: comparison.differing_points,
            percentage: comparison.percentage,
        })
    }
}
