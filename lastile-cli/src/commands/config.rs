//! Configuration management CLI commands.
//!
//! Provides `config path`, `config init` and `config show`. These commands
//! honor the global `--config` option and do not start logging.

use clap::Subcommand;
use std::path::Path;

use lastile::config::{config_file_path, ConfigFile};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the configuration file path
    Path,

    /// Write a configuration file with default values if none exists
    Init,

    /// Print the effective configuration
    Show,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands, config_path: Option<&Path>) -> Result<(), CliError> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config_file_path);

    match command {
        ConfigCommands::Path => run_path(&path),
        ConfigCommands::Init => run_init(&path),
        ConfigCommands::Show => run_show(&path),
    }
}

fn run_path(path: &Path) -> Result<(), CliError> {
    println!("{}", path.display());
    Ok(())
}

fn run_init(path: &Path) -> Result<(), CliError> {
    if path.exists() {
        println!("Configuration already exists: {}", path.display());
        return Ok(());
    }
    ConfigFile::default().save_to(path)?;
    println!("✓ Created {}", path.display());
    Ok(())
}

fn run_show(path: &Path) -> Result<(), CliError> {
    let config = ConfigFile::load_from(path)?;
    if !path.exists() {
        println!("; {} not found, showing defaults", path.display());
    }
    print!("{}", config.to_ini_string());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_then_keeps_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/config.ini");

        run(ConfigCommands::Init, Some(&path)).unwrap();
        assert!(path.exists());

        std::fs::write(&path, "[buffer]\ndistance = 12\n").unwrap();
        run(ConfigCommands::Init, Some(&path)).unwrap();
        assert_eq!(ConfigFile::load_from(&path).unwrap().buffer.distance, 12.0);
    }

    #[test]
    fn test_show_reports_invalid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.ini");
        std::fs::write(&path, "[grid]\norigin = center\n").unwrap();

        assert!(matches!(
            run(ConfigCommands::Show, Some(&path)),
            Err(CliError::ConfigFile(_))
        ));
    }
}
