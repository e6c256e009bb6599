//! Grid geometry: how file name coordinates map to ground extents.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::address::TileAddress;
use crate::extent::Extent;

/// Default tile width in ground units (1 km tiles).
pub const DEFAULT_TILE_WIDTH: f64 = 1000.0;

/// Default ground units per file name unit (coordinates in km).
pub const DEFAULT_COORD_SCALE: f64 = 1000.0;

/// Errors raised by invalid grid definitions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    /// Tile width or coordinate scale is zero, negative or not finite
    #[error("invalid grid: {name} must be a positive number, got {value}")]
    NotPositive { name: &'static str, value: f64 },

    /// The tile width is not a whole number of file name units
    #[error(
        "invalid grid: tile width {tile_width} is not a whole multiple of the coordinate scale {coord_scale}"
    )]
    NonIntegerStep { tile_width: f64, coord_scale: f64 },

    /// The points of a cloud straddle several grid cells
    #[error("points span several tiles of the grid: {reason}")]
    AmbiguousTile { reason: String },
}

/// Corner of the tile that the file name coordinates designate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GridOrigin {
    /// `x` is the west edge, `y` the north edge
    #[default]
    UpperLeft,
    /// `x` is the west edge, `y` the south edge
    LowerLeft,
}

impl fmt::Display for GridOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GridOrigin::UpperLeft => write!(f, "upper-left"),
            GridOrigin::LowerLeft => write!(f, "lower-left"),
        }
    }
}

impl FromStr for GridOrigin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "upper-left" | "upperleft" | "ul" => Ok(GridOrigin::UpperLeft),
            "lower-left" | "lowerleft" | "ll" => Ok(GridOrigin::LowerLeft),
            other => Err(format!("unknown grid origin '{}'", other)),
        }
    }
}

/// Geometry of a tile grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    tile_width: f64,
    coord_scale: f64,
    origin: GridOrigin,
    step: i64,
}

impl GridSpec {
    /// Creates a grid, checking that neighbors are a whole number of file
    /// name units apart.
    pub fn new(tile_width: f64, coord_scale: f64, origin: GridOrigin) -> Result<Self, GridError> {
        check_positive("tile width", tile_width)?;
        check_positive("coordinate scale", coord_scale)?;

        let ratio = tile_width / coord_scale;
        let rounded = ratio.round();
        if rounded < 1.0 || (ratio - rounded).abs() > 1e-9 {
            return Err(GridError::NonIntegerStep {
                tile_width,
                coord_scale,
            });
        }

        Ok(Self {
            tile_width,
            coord_scale,
            origin,
            step: rounded as i64,
        })
    }

    pub fn tile_width(&self) -> f64 {
        self.tile_width
    }

    pub fn coord_scale(&self) -> f64 {
        self.coord_scale
    }

    pub fn origin(&self) -> GridOrigin {
        self.origin
    }

    /// Distance between two adjacent tiles, in file name units.
    pub fn step(&self) -> i64 {
        self.step
    }

    /// Theoretical ground extent of a tile, from its file name.
    pub fn tile_extent(&self, address: &TileAddress) -> Extent {
        let xmin = address.x() as f64 * self.coord_scale;
        let y = address.y() as f64 * self.coord_scale;
        let (ymin, ymax) = match self.origin {
            GridOrigin::UpperLeft => (y - self.tile_width, y),
            GridOrigin::LowerLeft => (y, y + self.tile_width),
        };
        Extent {
            xmin,
            ymin,
            xmax: xmin + self.tile_width,
            ymax,
        }
    }

    /// Finds the grid cell containing the given point bounds.
    ///
    /// A point on the west or south edge belongs to the cell, as does a point
    /// on the east or north edge. Returns the cell extent, or
    /// [`GridError::AmbiguousTile`] when the bounds cross a cell boundary.
    pub fn infer_tile_extent(&self, bounds: &Extent) -> Result<Extent, GridError> {
        let w = self.tile_width;
        let col_lo = (bounds.xmin / w).floor();
        let col_hi = (bounds.xmax / w).ceil() - 1.0;
        let row_lo = (bounds.ymin / w).floor();
        let row_hi = (bounds.ymax / w).ceil() - 1.0;

        if col_lo != col_hi {
            return Err(GridError::AmbiguousTile {
                reason: format!("x range [{}, {}]", bounds.xmin, bounds.xmax),
            });
        }
        if row_lo != row_hi {
            return Err(GridError::AmbiguousTile {
                reason: format!("y range [{}, {}]", bounds.ymin, bounds.ymax),
            });
        }

        Ok(Extent {
            xmin: col_lo * w,
            ymin: row_lo * w,
            xmax: (col_lo + 1.0) * w,
            ymax: (row_lo + 1.0) * w,
        })
    }

    /// File name coordinates of the tile whose extent is given.
    pub fn address_coordinates(&self, tile: &Extent) -> (i64, i64) {
        let x = (tile.xmin / self.coord_scale).round() as i64;
        let y = match self.origin {
            GridOrigin::UpperLeft => tile.ymax,
            GridOrigin::LowerLeft => tile.ymin,
        };
        (x, (y / self.coord_scale).round() as i64)
    }
}

impl Default for GridSpec {
    fn default() -> Self {
        Self {
            tile_width: DEFAULT_TILE_WIDTH,
            coord_scale: DEFAULT_COORD_SCALE,
            origin: GridOrigin::UpperLeft,
            step: 1,
        }
    }
}

fn check_positive(name: &'static str, value: f64) -> Result<(), GridError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(GridError::NotPositive { name, value })
    }
}
