//! Tile grid: addresses parsed from file names, grid geometry and
//! neighborhood resolution.
//!
//! Neighbors are never looked up in an index: they are derived from the file
//! name of the central tile and intersected with a [`TileSet`] listing.

mod address;
mod neighbors;
mod spec;
mod tile_set;

pub use address::{ParseError, TileAddress};
pub use neighbors::{candidate_addresses, neighbors, Direction, Neighbor};
pub use spec::{GridError, GridOrigin, GridSpec, DEFAULT_COORD_SCALE, DEFAULT_TILE_WIDTH};
pub use tile_set::TileSet;
