//! lastile - Stitching and colorization of gridded LiDAR tiles
//!
//! This library works on point cloud tiles named after their position on a
//! regular grid (`Semis_2021_0770_6278_LA93_IGN69.laz`). It finds the
//! neighbors of a tile from its name, borrows their points to build a
//! buffered tile, strips that buffer afterwards, merges tiles, and colors
//! points from orthoimagery fetched over WMS.
//!
//! # Buffering a tile
//!
//! ```ignore
//! use lastile::buffer::{add_buffer, BufferConfig};
//! use lastile::codec::{LasCodec, WriteOptions};
//! use lastile::grid::TileSet;
//!
//! let tiles = TileSet::from_dir(Path::new("tiles"))?;
//! let config = BufferConfig::new().with_distance(20.0);
//! add_buffer(tile, &tiles, &config, output, &LasCodec::new(), &WriteOptions::new())?;
//! ```

pub mod batch;
pub mod buffer;
pub mod cloud;
pub mod codec;
pub mod color;
pub mod config;
pub mod error;
pub mod extent;
pub mod grid;
pub mod logging;
pub mod merge;
pub mod ops;
pub mod raster;

pub use error::TileError;

/// Version of the lastile library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
