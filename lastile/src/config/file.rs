//! Configuration file handling for ~/.lastile/config.ini.
//!
//! Loads and saves user configuration with sensible defaults.
//! Settings structs live in [`super::settings`], constants in [`super::defaults`],
//! parsing in [`super::parser`], and serialization in [`super::writer`].

use ini::Ini;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::settings::ConfigFile;
use crate::buffer::BufferConfig;
use crate::color::ColorizeConfig;
use crate::grid::{GridError, GridSpec};
use crate::raster::MosaicConfig;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// The grid settings do not describe a usable grid
    #[error("Invalid grid configuration: {0}")]
    Grid(#[from] GridError),

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path (~/.lastile/config.ini).
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Save configuration to the default path (~/.lastile/config.ini).
    pub fn save(&self) -> Result<(), ConfigFileError> {
        let path = config_file_path();
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        std::fs::write(path, self.to_ini_string())
            .map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// Commented INI text, as written by [`ConfigFile::save_to`].
    pub fn to_ini_string(&self) -> String {
        super::writer::to_config_string(self)
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }

    /// Tile grid described by the `[grid]` section.
    pub fn grid_spec(&self) -> Result<GridSpec, ConfigFileError> {
        Ok(GridSpec::new(
            self.grid.tile_width,
            self.grid.coord_scale,
            self.grid.origin,
        )?)
    }

    pub fn buffer_config(&self) -> Result<BufferConfig, ConfigFileError> {
        Ok(BufferConfig::new()
            .with_grid(self.grid_spec()?)
            .with_distance(self.buffer.distance))
    }

    pub fn mosaic_config(&self) -> MosaicConfig {
        MosaicConfig::new()
            .with_resolution(self.color.resolution)
            .with_max_block_size(self.color.max_block_size)
            .with_concurrency(self.color.concurrency)
    }

    /// Colorization settings with both layers enabled.
    pub fn colorize_config(&self) -> ColorizeConfig {
        ColorizeConfig::new()
            .with_mosaic(self.mosaic_config())
            .with_rgb_layer(Some(self.color.rgb_layer.clone()))
            .with_irc_layer(Some(self.color.irc_layer.clone()))
            .with_crs(self.output.srs.clone())
    }
}

/// Get the path to the config directory (~/.lastile).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".lastile")
}

/// Get the path to the config file (~/.lastile/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults::*;
    use crate::grid::GridOrigin;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();

        assert_eq!(config.buffer.distance, DEFAULT_BUFFER_DISTANCE);
        assert_eq!(config.color.resolution, DEFAULT_COLOR_RESOLUTION);
        assert_eq!(config.color.rgb_layer, DEFAULT_RGB_LAYER);
        assert_eq!(config.grid.origin, GridOrigin::UpperLeft);
        assert!(config.output.srs.is_none());
        assert!(config.logging.file.ends_with(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_load_nonexistent_returns_defaults() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.ini");

        let config = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_library_configs() {
        let mut config = ConfigFile::default();
        config.grid.tile_width = 2000.0;
        config.buffer.distance = 30.0;
        config.color.resolution = 0.5;
        config.output.srs = Some("EPSG:2154".to_string());

        let buffer = config.buffer_config().unwrap();
        assert_eq!(buffer.distance(), 30.0);
        assert_eq!(buffer.grid().step(), 2);

        let colorize = config.colorize_config();
        assert_eq!(colorize.mosaic().resolution(), 0.5);
        assert_eq!(colorize.layers().len(), 2);
    }

    #[test]
    fn test_invalid_grid() {
        let mut config = ConfigFile::default();
        config.grid.tile_width = 1500.0;
        assert!(matches!(config.grid_spec(), Err(ConfigFileError::Grid(_))));
    }
}
