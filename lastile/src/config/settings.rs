//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

use crate::grid::GridOrigin;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigFile {
    /// Tile grid geometry
    pub grid: GridSettings,
    /// Buffer assembly settings
    pub buffer: BufferSettings,
    /// Orthoimagery download and colorization settings
    pub color: ColorSettings,
    /// Output file settings
    pub output: OutputSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Grid configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSettings {
    /// Tile width in ground units
    pub tile_width: f64,
    /// Ground units per file name coordinate unit
    pub coord_scale: f64,
    /// Corner designated by the file name coordinates
    pub origin: GridOrigin,
}

/// Buffer configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferSettings {
    /// Margin around the tile, in ground units
    pub distance: f64,
}

/// Colorization configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorSettings {
    /// Ground size of an image pixel
    pub resolution: f64,
    /// Maximum width and height of one WMS request, in pixels
    pub max_block_size: u32,
    /// HTTP timeout in seconds
    pub timeout: u64,
    /// Maximum concurrent WMS requests
    pub concurrency: usize,
    /// WMS endpoint
    pub wms_url: String,
    /// Layer providing Red, Green and Blue
    pub rgb_layer: String,
    /// Layer providing Infrared
    pub irc_layer: String,
    /// Image MIME type requested from the WMS
    pub image_format: String,
}

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputSettings {
    /// Spatial reference forced on colorization requests (e.g. "EPSG:2154")
    pub srs: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
