//! Clip command - keep the points inside a 2D bounding box.

use clap::Args;
use std::path::PathBuf;

use lastile::extent::Extent;
use lastile::ops::clip_file;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the clip command.
#[derive(Debug, Args)]
pub struct ClipArgs {
    /// Input file
    pub input: PathBuf,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Box to keep, edges included
    #[arg(
        long,
        value_name = "XMIN,YMIN,XMAX,YMAX",
        value_parser = parse_bounds,
        allow_hyphen_values = true
    )]
    pub bounds: Extent,
}

fn parse_bounds(s: &str) -> Result<Extent, String> {
    let values = s
        .split(',')
        .map(|v| {
            v.trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| format!("'{}' is not a finite number", v.trim()))
        })
        .collect::<Result<Vec<f64>, String>>()?;

    let [xmin, ymin, xmax, ymax] = values[..] else {
        return Err(format!("expected XMIN,YMIN,XMAX,YMAX, got '{}'", s));
    };
    if xmin > xmax || ymin > ymax {
        return Err(format!("minimum exceeds maximum in '{}'", s));
    }
    Ok(Extent::new(xmin, ymin, xmax, ymax))
}

/// Run the clip command.
pub fn run(args: ClipArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("clip");

    let summary = clip_file(
        &args.input,
        &args.output,
        &args.bounds,
        runner.codec(),
        &runner.write_options(),
    )?;

    println!(
        "Kept {} points, removed {}: {}",
        summary.kept,
        summary.removed,
        args.output.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ClipArgs,
    }

    #[test]
    fn test_parse_bounds() {
        let cli = TestCli::try_parse_from([
            "clip",
            "in.laz",
            "-o",
            "out.laz",
            "--bounds",
            "770000, 6277000,770500,6277500",
        ])
        .unwrap();
        assert_eq!(cli.args.bounds.xmin, 770_000.0);
        assert_eq!(cli.args.bounds.ymax, 6_277_500.0);
    }

    #[test]
    fn test_negative_bounds_are_accepted() {
        let bounds = parse_bounds("-10,-5,0,0").unwrap();
        assert_eq!(bounds.xmin, -10.0);
        assert_eq!(bounds.ymin, -5.0);
    }

    #[test]
    fn test_malformed_bounds_are_rejected() {
        assert!(parse_bounds("1,2,3").is_err());
        assert!(parse_bounds("1,2,3,x").is_err());
        assert!(parse_bounds("5,0,1,10").is_err());
        assert!(parse_bounds("0,NaN,1,10").is_err());
        assert!(parse_bounds("0,0,inf,10").is_err());
    }
}
