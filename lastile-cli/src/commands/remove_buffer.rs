//! Remove-buffer command - keep only the points of the tile itself.

use clap::Args;
use std::path::PathBuf;

use lastile::buffer::remove_buffer;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the remove-buffer command.
#[derive(Debug, Args)]
pub struct RemoveBufferArgs {
    /// Buffered tile written by add-buffer
    pub input: PathBuf,

    /// Output file
    #[arg(short, long)]
    pub output: PathBuf,
}

/// Run the remove-buffer command.
pub fn run(args: RemoveBufferArgs, runner: &CliRunner) -> Result<(), CliError> {
    runner.log_startup("remove-buffer");

    let summary = remove_buffer(
        &args.input,
        &args.output,
        runner.codec(),
        &runner.write_options(),
    )?;

    println!(
        "Kept {} points, removed {} buffer points: {}",
        summary.kept,
        summary.removed,
        args.output.display()
    );
    Ok(())
}
