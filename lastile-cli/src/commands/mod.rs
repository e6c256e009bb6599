//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`add_buffer`] - Buffered tiles, one or a whole directory
//! - [`clip`] - Cropping to a 2D bounding box
//! - [`colorize`] - Colors from WMS orthoimagery
//! - [`compare`] - Point by point comparison of two files
//! - [`config`] - Configuration management (path, init, show)
//! - [`dimensions`] - Renaming and removal of dimensions
//! - [`merge`] - Concatenation of files or of a tile neighborhood
//! - [`occurrences`] - Value histograms and replacement
//! - [`remove_buffer`] - Removal of a buffer
//! - [`standardize`] - Standard scale, offset and point format
//! - [`tile_origin`] - Grid tile of a file from its points

pub mod add_buffer;
pub mod clip;
pub mod colorize;
pub mod compare;
pub mod config;
pub mod dimensions;
pub mod merge;
pub mod occurrences;
pub mod remove_buffer;
pub mod standardize;
pub mod tile_origin;
