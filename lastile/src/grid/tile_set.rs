//! Tile sets built from a directory listing.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::address::{ParseError, TileAddress};

/// Extensions recognized as point cloud tiles.
const TILE_EXTENSIONS: &[&str] = &["las", "laz"];

/// Tiles available on disk, indexed by grid address.
///
/// The set is a snapshot of one directory listing; it is rebuilt on every
/// invocation and never persisted.
#[derive(Debug, Clone, Default)]
pub struct TileSet {
    tiles: HashMap<TileAddress, PathBuf>,
    skipped: Vec<(PathBuf, ParseError)>,
}

impl TileSet {
    /// Lists the LAS/LAZ files of `dir`.
    ///
    /// Files whose names do not parse as tile addresses are skipped and
    /// logged; they are still reported through [`TileSet::skipped`].
    pub fn from_dir(dir: &Path) -> io::Result<Self> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_tile_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();

        let set = Self::from_paths(paths);
        debug!(
            dir = %dir.display(),
            tiles = set.len(),
            skipped = set.skipped.len(),
            "Listed tile directory"
        );
        Ok(set)
    }

    /// Builds a set from explicit paths.
    pub fn from_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let mut set = Self::default();
        for path in paths {
            let path = path.into();
            match TileAddress::parse(&path) {
                Ok(address) => {
                    if let Some(previous) = set.tiles.insert(address, path.clone()) {
                        warn!(
                            kept = %path.display(),
                            dropped = %previous.display(),
                            "Two files share the same tile address"
                        );
                    }
                }
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "Skipping file with unparseable name");
                    set.skipped.push((path, e));
                }
            }
        }
        set
    }

    /// Path of the tile at `address`, if present.
    pub fn get(&self, address: &TileAddress) -> Option<&Path> {
        self.tiles.get(address).map(PathBuf::as_path)
    }

    pub fn contains(&self, address: &TileAddress) -> bool {
        self.tiles.contains_key(address)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Iterates over tiles in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&TileAddress, &Path)> {
        self.tiles.iter().map(|(a, p)| (a, p.as_path()))
    }

    /// Tile paths sorted by name.
    pub fn sorted_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.tiles.values().cloned().collect();
        paths.sort();
        paths
    }

    /// Files that were listed but could not be parsed.
    pub fn skipped(&self) -> &[(PathBuf, ParseError)] {
        &self.skipped
    }
}

fn is_tile_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| TILE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
