//! Parallel runs of a tile operation over many files.
//!
//! Each tile is processed on a rayon worker with no shared mutable state
//! beyond a progress counter. A failing tile never stops the run: every
//! outcome is collected in a [`BatchReport`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::buffer::{add_buffer, BufferConfig, BufferSummary};
use crate::codec::{PointCloudCodec, WriteOptions};
use crate::error::TileError;
use crate::grid::TileSet;

/// Outcome of one tile.
#[derive(Debug)]
pub struct TileOutcome<T> {
    pub path: PathBuf,
    pub result: Result<T, TileError>,
}

/// Outcomes of a batch run, in input order.
#[derive(Debug)]
pub struct BatchReport<T> {
    pub outcomes: Vec<TileOutcome<T>>,
}

impl<T> BatchReport<T> {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    /// Files skipped because their name is not a tile name.
    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(&o.result, Err(e) if e.is_skippable()))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.failures().count()
    }

    /// Failed tiles, skipped files excluded.
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &TileError)> {
        self.outcomes.iter().filter_map(|o| match &o.result {
            Err(e) if !e.is_skippable() => Some((o.path.as_path(), e)),
            _ => None,
        })
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }
}

/// Runs `operation` on every path in parallel.
pub fn run_batch<T, F>(paths: &[PathBuf], operation: F) -> BatchReport<T>
where
    T: Send,
    F: Fn(&Path) -> Result<T, TileError> + Sync,
{
    let total = paths.len();
    let completed = AtomicUsize::new(0);

    let outcomes: Vec<TileOutcome<T>> = paths
        .par_iter()
        .map(|path| {
            let result = operation(path);
            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            match &result {
                Ok(_) => debug!(tile = %path.display(), done, total, "Tile done"),
                Err(e) if e.is_skippable() => {
                    warn!(file = %path.display(), error = %e, "File skipped")
                }
                Err(e) => error!(tile = %path.display(), error = %e, "Tile failed"),
            }
            TileOutcome {
                path: path.clone(),
                result,
            }
        })
        .collect();

    BatchReport { outcomes }
}

/// Buffers every tile of `tiles` into `output_dir`, keeping file names.
pub fn add_buffer_all<C: PointCloudCodec + ?Sized>(
    tiles: &TileSet,
    config: &BufferConfig,
    output_dir: &Path,
    codec: &C,
    options: &WriteOptions,
) -> BatchReport<BufferSummary> {
    let paths = tiles.sorted_paths();
    let report = run_batch(&paths, |tile| {
        let output = output_path(tile, output_dir)?;
        add_buffer(tile, tiles, config, &output, codec, options)
    });
    info!(
        tiles = paths.len(),
        succeeded = report.succeeded(),
        failed = report.failed(),
        output_dir = %output_dir.display(),
        "Buffered tiles"
    );
    report
}

fn output_path(input: &Path, output_dir: &Path) -> Result<PathBuf, TileError> {
    let name = input.file_name().ok_or_else(|| TileError::Io {
        path: input.to_path_buf(),
        source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a file path"),
    })?;
    Ok(output_dir.join(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::testing::cloud_with;
    use crate::codec::MemoryCodec;
    use crate::grid::ParseError;

    #[test]
    fn test_run_batch_keeps_going() {
        let paths: Vec<PathBuf> = ["a", "b", "c", "d"].iter().map(PathBuf::from).collect();
        let report = run_batch(&paths, |path| match path.to_str() {
            Some("b") => Err(TileError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::other("disk full"),
            }),
            Some("c") => Err(TileError::Parse(ParseError::Pattern {
                name: "c".to_string(),
            })),
            _ => Ok(1),
        });

        assert_eq!(report.outcomes.len(), 4);
        assert_eq!(report.outcomes[3].path, PathBuf::from("d"));
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_success());
        let failed: Vec<_> = report.failures().map(|(p, _)| p.to_path_buf()).collect();
        assert_eq!(failed, vec![PathBuf::from("b")]);
    }

    #[test]
    fn test_add_buffer_all() {
        let codec = MemoryCodec::new();
        let west = "/in/Semis_2021_0770_6278_LA93_IGN69.laz";
        let east = "/in/Semis_2021_0771_6278_LA93_IGN69.laz";
        codec.insert(west, cloud_with(&[(770_990.0, 6_277_500.0, 1.0)]));
        codec.insert(east, cloud_with(&[(771_010.0, 6_277_500.0, 2.0)]));
        let tiles = TileSet::from_paths([west, east]);

        let report = add_buffer_all(
            &tiles,
            &BufferConfig::new().with_distance(20.0),
            Path::new("/out"),
            &codec,
            &WriteOptions::new(),
        );

        assert!(report.is_success());
        assert_eq!(report.succeeded(), 2);
        for outcome in &report.outcomes {
            assert_eq!(outcome.result.as_ref().unwrap().buffer_points, 1);
        }
        let out = codec
            .get(Path::new("/out/Semis_2021_0770_6278_LA93_IGN69.laz"))
            .unwrap();
        assert_eq!(out.len(), 2);
    }
}
