//! Points and their provenance.

use super::dimension::Value;

/// Origin of a point in a buffered tile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Provenance {
    /// The point belongs to the tile itself
    #[default]
    Tile,
    /// The point was borrowed from a neighbor tile
    Buffer,
}

impl Provenance {
    /// On-disk flag: 1 for tile points, 0 for buffer points.
    pub fn flag(self) -> u8 {
        match self {
            Provenance::Tile => 1,
            Provenance::Buffer => 0,
        }
    }

    pub fn from_flag(flag: u8) -> Self {
        if flag == 0 {
            Provenance::Buffer
        } else {
            Provenance::Tile
        }
    }
}

/// A single point: coordinates, provenance and attribute values.
///
/// `values` is aligned on the schema of the cloud that owns the point.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub provenance: Provenance,
    pub values: Vec<Value>,
}

impl Point {
    pub fn new(x: f64, y: f64, z: f64, values: Vec<Value>) -> Self {
        Self {
            x,
            y,
            z,
            provenance: Provenance::Tile,
            values,
        }
    }

    pub fn with_provenance(mut self, provenance: Provenance) -> Self {
        self.provenance = provenance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_round_trip() {
        assert_eq!(Provenance::from_flag(Provenance::Tile.flag()), Provenance::Tile);
        assert_eq!(Provenance::from_flag(Provenance::Buffer.flag()), Provenance::Buffer);
        assert_eq!(Provenance::from_flag(7), Provenance::Tile);
    }
}
