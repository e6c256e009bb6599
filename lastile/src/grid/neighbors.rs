//! 8-connected neighborhood of a tile.

use std::fmt;
use std::path::PathBuf;

use super::address::TileAddress;
use super::spec::GridSpec;
use super::tile_set::TileSet;
use crate::extent::Sides;

/// Position of a neighbor relative to the central tile.
///
/// The ordering of the variants is the order in which neighbors are
/// resolved and their points appended to a buffered tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    NorthWest,
    North,
    NorthEast,
    West,
    East,
    SouthWest,
    South,
    SouthEast,
}

impl Direction {
    /// All eight directions, in resolution order.
    pub const ALL: [Direction; 8] = [
        Direction::NorthWest,
        Direction::North,
        Direction::NorthEast,
        Direction::West,
        Direction::East,
        Direction::SouthWest,
        Direction::South,
        Direction::SouthEast,
    ];

    /// Unit offset `(dx, dy)` with `y` growing northward.
    pub fn offset(self) -> (i64, i64) {
        match self {
            Direction::NorthWest => (-1, 1),
            Direction::North => (0, 1),
            Direction::NorthEast => (1, 1),
            Direction::West => (-1, 0),
            Direction::East => (1, 0),
            Direction::SouthWest => (-1, -1),
            Direction::South => (0, -1),
            Direction::SouthEast => (1, -1),
        }
    }

    /// Direction pointing back to the central tile.
    pub fn opposite(self) -> Direction {
        match self {
            Direction::NorthWest => Direction::SouthEast,
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
            Direction::SouthWest => Direction::NorthEast,
            Direction::South => Direction::North,
            Direction::SouthEast => Direction::NorthWest,
        }
    }

    /// Sides of the central tile touched by this neighbor.
    ///
    /// A diagonal neighbor touches two sides.
    pub fn sides(self) -> Sides {
        let (dx, dy) = self.offset();
        Sides {
            west: dx < 0,
            east: dx > 0,
            south: dy < 0,
            north: dy > 0,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::NorthWest => "north-west",
            Direction::North => "north",
            Direction::NorthEast => "north-east",
            Direction::West => "west",
            Direction::East => "east",
            Direction::SouthWest => "south-west",
            Direction::South => "south",
            Direction::SouthEast => "south-east",
        };
        f.write_str(name)
    }
}

/// A neighbor tile present in the tile set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Neighbor {
    pub direction: Direction,
    pub address: TileAddress,
    pub path: PathBuf,
}

/// Addresses of the theoretical neighbors, present or not.
///
/// Neighbors whose coordinates would leave the `i64` range are left out.
pub fn candidate_addresses(
    address: &TileAddress,
    grid: &GridSpec,
) -> Vec<(Direction, TileAddress)> {
    let step = grid.step();
    Direction::ALL
        .into_iter()
        .filter_map(|direction| {
            let (dx, dy) = direction.offset();
            let candidate = address.with_offset(dx.checked_mul(step)?, dy.checked_mul(step)?)?;
            Some((direction, candidate))
        })
        .collect()
}

/// Resolves the neighbors of `address` that exist in `tiles`.
///
/// Missing neighbors (grid border, holes in the coverage) are simply absent
/// from the result.
pub fn neighbors(address: &TileAddress, grid: &GridSpec, tiles: &TileSet) -> Vec<Neighbor> {
    candidate_addresses(address, grid)
        .into_iter()
        .filter_map(|(direction, candidate)| {
            let path = tiles.get(&candidate)?.to_path_buf();
            Some(Neighbor {
                direction,
                address: candidate,
                path,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::path::Path;

    const CENTER: &str = "Semis_2021_0770_6278_LA93_IGN69.laz";

    fn tile_set(names: &[&str]) -> TileSet {
        TileSet::from_paths(names.iter().map(|n| Path::new("/tiles").join(n)))
    }

    #[test]
    fn test_reference_neighborhood_resolves_east_and_north_east() {
        let tiles = tile_set(&[
            CENTER,
            "Semis_2021_0771_6278_LA93_IGN69.laz",
            "Semis_2021_0771_6279_LA93_IGN69.laz",
        ]);
        let center = TileAddress::parse(CENTER).unwrap();

        let found = neighbors(&center, &GridSpec::default(), &tiles);
        let directions: Vec<Direction> = found.iter().map(|n| n.direction).collect();
        assert_eq!(directions, vec![Direction::NorthEast, Direction::East]);
        assert_eq!(
            found[1].path,
            Path::new("/tiles/Semis_2021_0771_6278_LA93_IGN69.laz")
        );
    }

    #[test]
    fn test_isolated_tile_has_no_neighbors() {
        let tiles = tile_set(&[CENTER]);
        let center = TileAddress::parse(CENTER).unwrap();
        assert!(neighbors(&center, &GridSpec::default(), &tiles).is_empty());
    }

    #[test]
    fn test_other_series_are_not_neighbors() {
        let tiles = tile_set(&[CENTER, "Semis_2022_0771_6278_LA93_IGN69.laz"]);
        let center = TileAddress::parse(CENTER).unwrap();
        assert!(neighbors(&center, &GridSpec::default(), &tiles).is_empty());
    }

    #[test]
    fn test_candidates_use_grid_step() {
        let grid = GridSpec::new(500.0, 1.0, crate::grid::GridOrigin::LowerLeft).unwrap();
        let center = TileAddress::new("a_b", 1000, 2000, "c.las");
        let candidates = candidate_addresses(&center, &grid);
        let east = candidates
            .iter()
            .find(|(d, _)| *d == Direction::East)
            .map(|(_, a)| a.clone())
            .unwrap();
        assert_eq!(east, TileAddress::new("a_b", 1500, 2000, "c.las"));
    }

    #[test]
    fn test_tile_at_coordinate_limit_keeps_reachable_neighbors() {
        let name = "LHD_FXX_9223372036854775807_6278_PTS_C_LAMB93_IGN69.laz";
        let west = "LHD_FXX_9223372036854775806_6278_PTS_C_LAMB93_IGN69.laz";
        let tiles = tile_set(&[name, west]);
        let center = TileAddress::parse(name).unwrap();

        let candidates = candidate_addresses(&center, &GridSpec::default());
        let directions: Vec<Direction> = candidates.iter().map(|(d, _)| *d).collect();
        assert_eq!(
            directions,
            vec![
                Direction::NorthWest,
                Direction::North,
                Direction::West,
                Direction::SouthWest,
                Direction::South,
            ]
        );

        let found = neighbors(&center, &GridSpec::default(), &tiles);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].direction, Direction::West);
    }

    #[test]
    fn test_diagonal_touches_two_sides() {
        let sides = Direction::SouthWest.sides();
        assert!(sides.south && sides.west);
        assert!(!sides.north && !sides.east);
    }

    #[test]
    fn test_opposite_is_an_involution() {
        for direction in Direction::ALL {
            assert_eq!(direction.opposite().opposite(), direction);
            let (dx, dy) = direction.offset();
            assert_eq!(direction.opposite().offset(), (-dx, -dy));
        }
    }

    proptest! {
        #[test]
        fn prop_neighborhood_is_symmetric(
            cells in prop::collection::hash_set((0i64..6, 0i64..6), 1..20),
        ) {
            let names: Vec<String> = cells
                .iter()
                .map(|(x, y)| TileAddress::new("Semis_2021", *x, *y, "LA93.laz").file_name())
                .collect();
            let tiles = TileSet::from_paths(names.iter().map(|n| Path::new("/t").join(n)));
            let grid = GridSpec::default();

            let mut edges = HashSet::new();
            for (address, _) in tiles.iter() {
                for neighbor in neighbors(address, &grid, &tiles) {
                    edges.insert((address.clone(), neighbor.address.clone()));
                }
            }
            for (a, b) in &edges {
                prop_assert!(edges.contains(&(b.clone(), a.clone())));
            }
        }
    }
}
