//! CLI runner for common setup and operations.
//!
//! Encapsulates configuration loading, logging initialization and the
//! shared codec to reduce duplication across command handlers.

use std::path::{Path, PathBuf};
use tracing::info;

use lastile::codec::{LasCodec, WriteOptions};
use lastile::config::ConfigFile;
use lastile::grid::TileSet;
use lastile::logging::{init_logging, split_log_path, LoggingGuard};

use crate::error::CliError;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
    codec: LasCodec,
}

impl CliRunner {
    /// Create a new CLI runner, loading config and initializing logging.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Configuration file to use instead of ~/.lastile/config.ini
    /// * `verbose` - When true, enables debug-level logging regardless of RUST_LOG
    pub fn new(config_path: Option<&Path>, verbose: bool) -> Result<Self, CliError> {
        // Load config file (or use defaults if not present)
        let config = match config_path {
            Some(path) => ConfigFile::load_from(path)?,
            None => ConfigFile::load()?,
        };

        let (log_dir, log_file) = split_log_path(&config.logging.file);
        let logging_guard = init_logging(&log_dir, &log_file, verbose)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
            codec: LasCodec::new(),
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn codec(&self) -> &LasCodec {
        &self.codec
    }

    /// Write options of the commands that keep the input attributes.
    pub fn write_options(&self) -> WriteOptions {
        WriteOptions {
            generating_software: Some(format!("lastile {}", lastile::VERSION)),
            ..WriteOptions::default()
        }
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("lastile v{}", lastile::VERSION);
        info!("lastile CLI: {} command", command);
    }

    /// List the tiles of `dir`, or of the directory holding `tile`.
    pub fn tile_set(&self, tile: &Path, dir: Option<&Path>) -> Result<TileSet, CliError> {
        let dir = match dir {
            Some(dir) => dir.to_path_buf(),
            None => tile_directory(tile),
        };
        let tiles = TileSet::from_dir(&dir).map_err(|error| CliError::Io {
            path: dir.clone(),
            error,
        })?;
        for (path, reason) in tiles.skipped() {
            info!(file = %path.display(), %reason, "Not a tile, ignored");
        }
        Ok(tiles)
    }
}

/// Directory holding `tile`, the current directory for a bare file name.
pub fn tile_directory(tile: &Path) -> PathBuf {
    tile.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_directory() {
        assert_eq!(
            tile_directory(Path::new("/data/Semis_2021_0770_6278_LA93_IGN69.laz")),
            PathBuf::from("/data")
        );
        assert_eq!(
            tile_directory(Path::new("Semis_2021_0770_6278_LA93_IGN69.laz")),
            PathBuf::from(".")
        );
    }
}
