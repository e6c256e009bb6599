//! User configuration.
//!
//! Settings are read from `~/.lastile/config.ini` and turned into the typed
//! configs of the library ([`GridSpec`], [`BufferConfig`], [`MosaicConfig`],
//! [`ColorizeConfig`]). Command-line flags override them.
//!
//! # Example
//!
//! ```
//! use lastile::config::ConfigFile;
//!
//! let config = ConfigFile::default();
//! let buffer = config.buffer_config().unwrap();
//! assert_eq!(buffer.distance(), 100.0);
//! ```
//!
//! [`GridSpec`]: crate::grid::GridSpec
//! [`BufferConfig`]: crate::buffer::BufferConfig
//! [`MosaicConfig`]: crate::raster::MosaicConfig
//! [`ColorizeConfig`]: crate::color::ColorizeConfig

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    BufferSettings, ColorSettings, ConfigFile, GridSettings, LoggingSettings, OutputSettings,
};
