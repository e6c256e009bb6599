//! In-memory codec.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::{CodecError, PointCloudCodec, WriteOptions};
use crate::cloud::PointCloud;

/// Codec storing clouds in a map keyed by path.
///
/// Useful to exercise file-level operations without touching the disk.
#[derive(Debug, Default)]
pub struct MemoryCodec {
    files: Mutex<HashMap<PathBuf, PointCloud>>,
}

impl MemoryCodec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a cloud under `path`.
    pub fn insert(&self, path: impl Into<PathBuf>, cloud: PointCloud) {
        self.lock().insert(path.into(), cloud);
    }

    /// Returns a copy of the cloud stored under `path`.
    pub fn get(&self, path: &Path) -> Option<PointCloud> {
        self.lock().get(path).cloned()
    }

    /// Stored paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.lock().keys().cloned().collect();
        paths.sort();
        paths
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, PointCloud>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PointCloudCodec for MemoryCodec {
    fn read(&self, path: &Path) -> Result<PointCloud, CodecError> {
        self.get(path).ok_or_else(|| CodecError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::NotFound, "no such cloud"),
        })
    }

    fn write(
        &self,
        cloud: &PointCloud,
        path: &Path,
        _options: &WriteOptions,
    ) -> Result<(), CodecError> {
        self.insert(path, cloud.clone());
        Ok(())
    }
}
