//! Tile address parsing.
//!
//! Tiles are named `{prefix1}_{prefix2}_{x}_{y}_{suffix}`, for example
//! `Semis_2021_0770_6278_LA93_IGN69.laz`. The suffix keeps everything after
//! the fourth underscore, extension included.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::Path;
use thiserror::Error;

/// Errors raised while parsing a tile file name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The name does not split into five `_`-separated fields
    #[error("file name '{name}' does not have the expected format prefix1_prefix2_x_y_suffix")]
    Pattern { name: String },

    /// One of the coordinate fields is not an integer
    #[error("file name '{name}': coordinate field '{field}' is not an integer")]
    Coordinate { name: String, field: String },
}

/// Grid address of a tile, derived from its file name.
///
/// Equality and hashing only consider the prefix, the coordinates and the
/// suffix: `0770` and `770` designate the same tile.
#[derive(Debug, Clone)]
pub struct TileAddress {
    prefix: String,
    x: i64,
    y: i64,
    suffix: String,
    x_digits: usize,
    y_digits: usize,
}

impl TileAddress {
    /// Creates an address from its parts, formatting coordinates on 4 digits.
    pub fn new(prefix: impl Into<String>, x: i64, y: i64, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            x,
            y,
            suffix: suffix.into(),
            x_digits: 4,
            y_digits: 4,
        }
    }

    /// Parses an address from a file name or a full path.
    ///
    /// Only the base name is considered.
    pub fn parse(file: impl AsRef<Path>) -> Result<Self, ParseError> {
        let file = file.as_ref();
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let fields: Vec<&str> = name.splitn(5, '_').collect();
        if fields.len() != 5 || fields.iter().any(|f| f.is_empty()) {
            return Err(ParseError::Pattern { name });
        }

        let x = parse_coordinate(&name, fields[2])?;
        let y = parse_coordinate(&name, fields[3])?;

        Ok(Self {
            prefix: format!("{}_{}", fields[0], fields[1]),
            x,
            y,
            suffix: fields[4].to_string(),
            x_digits: digit_count(fields[2]),
            y_digits: digit_count(fields[3]),
        })
    }

    /// `{prefix1}_{prefix2}` part of the name.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Grid x coordinate, in file name units.
    pub fn x(&self) -> i64 {
        self.x
    }

    /// Grid y coordinate, in file name units.
    pub fn y(&self) -> i64 {
        self.y
    }

    /// Everything after the coordinates, extension included.
    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Returns the address shifted by `(dx, dy)` file name units.
    ///
    /// The zero padding of the coordinates is preserved so that the derived
    /// name matches the naming of the rest of the grid. Returns `None` when
    /// the shifted coordinates do not fit in an `i64`.
    pub fn with_offset(&self, dx: i64, dy: i64) -> Option<Self> {
        Some(Self {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
            ..self.clone()
        })
    }

    /// Rebuilds the file name of this address.
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}_{}_{}",
            self.prefix,
            pad(self.x, self.x_digits),
            pad(self.y, self.y_digits),
            self.suffix
        )
    }

    /// Checks that both addresses belong to the same tile series
    /// (same prefix and suffix).
    pub fn same_series(&self, other: &TileAddress) -> bool {
        self.prefix == other.prefix && self.suffix == other.suffix
    }
}

impl PartialEq for TileAddress {
    fn eq(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y && self.same_series(other)
    }
}

impl Eq for TileAddress {}

impl Hash for TileAddress {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.prefix.hash(state);
        self.x.hash(state);
        self.y.hash(state);
        self.suffix.hash(state);
    }
}

impl fmt::Display for TileAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.file_name())
    }
}

fn parse_coordinate(name: &str, field: &str) -> Result<i64, ParseError> {
    field.parse::<i64>().map_err(|_| ParseError::Coordinate {
        name: name.to_string(),
        field: field.to_string(),
    })
}

fn digit_count(field: &str) -> usize {
    field.trim_start_matches(['-', '+']).len()
}

fn pad(value: i64, digits: usize) -> String {
    if value < 0 {
        format!("-{:0width$}", value.unsigned_abs(), width = digits)
    } else {
        format!("{:0width$}", value, width = digits)
    }
}
