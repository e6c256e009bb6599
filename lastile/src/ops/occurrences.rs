//! Histograms and replacement of integer dimension values.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};

use super::OpsError;
use crate::cloud::{Dimension, PointCloud, Value};
use crate::codec::{PointCloudCodec, WriteOptions};
use crate::error::TileError;

/// Number of points per value of a dimension.
///
/// Serialized as a JSON object keyed by value, the format produced and
/// merged by the counting tools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OccurrenceCounts(BTreeMap<i64, u64>);

impl OccurrenceCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, value: i64, count: u64) {
        *self.0.entry(value).or_insert(0) += count;
    }

    pub fn get(&self, value: i64) -> u64 {
        self.0.get(&value).copied().unwrap_or(0)
    }

    /// Adds every count of `other`.
    pub fn merge(&mut self, other: &OccurrenceCounts) {
        for (&value, &count) in &other.0 {
            self.add(value, count);
        }
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Values and counts, by increasing value.
    pub fn iter(&self) -> impl Iterator<Item = (i64, u64)> + '_ {
        self.0.iter().map(|(&v, &c)| (v, c))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn save(&self, path: &Path) -> Result<(), OpsError> {
        let json = self.to_json().map_err(|source| OpsError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| OpsError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, OpsError> {
        let text = fs::read_to_string(path).map_err(|source| OpsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| OpsError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Column index of an integer dimension.
fn integer_column(cloud: &PointCloud, dimension: &Dimension) -> Result<usize, OpsError> {
    let index = cloud
        .schema()
        .index_of(dimension)
        .ok_or_else(|| OpsError::UnknownDimension(dimension.name().to_string()))?;
    let kind = cloud.schema().at(index).kind;
    if !kind.is_integer() {
        return Err(OpsError::NotInteger {
            dimension: dimension.name().to_string(),
            kind,
        });
    }
    Ok(index)
}

/// Counts the points of each value of an integer dimension.
pub fn count_occurrences(
    cloud: &PointCloud,
    dimension: &Dimension,
) -> Result<OccurrenceCounts, OpsError> {
    let column = integer_column(cloud, dimension)?;
    let mut counts = OccurrenceCounts::new();
    for point in cloud.points() {
        if let Some(value) = point.values[column].as_i64() {
            counts.add(value, 1);
        }
    }
    Ok(counts)
}

/// Counts occurrences over several files.
#[instrument(level = "debug", skip_all, fields(files = paths.len(), dimension = %dimension))]
pub fn count_files<C: PointCloudCodec + ?Sized>(
    paths: &[PathBuf],
    dimension: &Dimension,
    codec: &C,
) -> Result<OccurrenceCounts, TileError> {
    let mut all = OccurrenceCounts::new();
    for path in paths {
        debug!(file = %path.display(), "Counting values");
        let counts = count_occurrences(&codec.read(path)?, dimension)?;
        all.merge(&counts);
    }
    info!(
        files = paths.len(),
        values = all.len(),
        points = all.total(),
        "Counted occurrences"
    );
    Ok(all)
}

/// Sums counts saved as JSON files.
pub fn merge_count_files(paths: &[PathBuf]) -> Result<OccurrenceCounts, OpsError> {
    let mut all = OccurrenceCounts::new();
    for path in paths {
        all.merge(&OccurrenceCounts::load(path)?);
    }
    Ok(all)
}

/// Values to replace, as `new value -> [old values]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementMap {
    targets: BTreeMap<i64, Vec<i64>>,
    lookup: HashMap<i64, i64>,
}

impl ReplacementMap {
    /// Builds a map, refusing a source value listed more than once.
    pub fn new(targets: BTreeMap<i64, Vec<i64>>) -> Result<Self, OpsError> {
        let mut occurrences: BTreeMap<i64, usize> = BTreeMap::new();
        for source in targets.values().flatten() {
            *occurrences.entry(*source).or_insert(0) += 1;
        }
        if let Some((value, count)) = occurrences.into_iter().find(|(_, count)| *count > 1) {
            return Err(OpsError::DuplicateSource { value, count });
        }

        let lookup = targets
            .iter()
            .flat_map(|(&target, sources)| sources.iter().map(move |&s| (s, target)))
            .collect();
        Ok(Self { targets, lookup })
    }

    /// Reads a JSON object such as `{"1": [2, 3], "6": [64]}`.
    pub fn load(path: &Path) -> Result<Self, OpsError> {
        let text = fs::read_to_string(path).map_err(|source| OpsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let targets = serde_json::from_str(&text).map_err(|source| OpsError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        Self::new(targets)
    }

    /// Replacement of `value`, if any.
    pub fn target(&self, value: i64) -> Option<i64> {
        self.lookup.get(&value).copied()
    }

    pub fn targets(&self) -> &BTreeMap<i64, Vec<i64>> {
        &self.targets
    }
}

/// Replaces values of an integer dimension. Returns the number of points
/// changed.
///
/// Each point is looked up with its original value, so replacements never
/// chain.
pub fn replace_occurrences(
    cloud: &mut PointCloud,
    dimension: &Dimension,
    map: &ReplacementMap,
) -> Result<usize, OpsError> {
    let column = integer_column(cloud, dimension)?;
    let kind = cloud.schema().at(column).kind;

    let mut converted: HashMap<i64, Value> = HashMap::new();
    for &target in map.targets().keys() {
        let value = Value::from_i64(kind, target).ok_or_else(|| OpsError::ValueOutOfRange {
            dimension: dimension.name().to_string(),
            value: target,
        })?;
        converted.insert(target, value);
    }

    let mut changed = 0;
    for point in cloud.points_mut() {
        let Some(old) = point.values[column].as_i64() else {
            continue;
        };
        if let Some(value) = map.target(old).and_then(|t| converted.get(&t)) {
            point.values[column] = *value;
            changed += 1;
        }
    }
    Ok(changed)
}

/// Writes `input` with replaced values to `output`.
#[instrument(level = "debug", skip_all, fields(input = %input.display()))]
pub fn replace_occurrences_file<C: PointCloudCodec + ?Sized>(
    input: &Path,
    output: &Path,
    dimension: &Dimension,
    map: &ReplacementMap,
    codec: &C,
    options: &WriteOptions,
) -> Result<usize, TileError> {
    let mut cloud = codec.read(input)?;
    let changed = replace_occurrences(&mut cloud, dimension, map)?;
    codec.write(&cloud, output, options)?;
    info!(output = %output.display(), changed, "Replaced values");
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::testing::cloud_with;
    use crate::codec::MemoryCodec;
    use tempfile::TempDir;

    fn classified(classes: &[f64]) -> PointCloud {
        let mut cloud = cloud_with(&vec![(0.0, 0.0, 0.0); classes.len()]);
        for (i, class) in classes.iter().enumerate() {
            cloud.set_value(i, &Dimension::Classification, *class);
        }
        cloud
    }

    #[test]
    fn test_count() {
        let counts =
            count_occurrences(&classified(&[2.0, 2.0, 6.0]), &Dimension::Classification).unwrap();
        assert_eq!(counts.get(2), 2);
        assert_eq!(counts.get(6), 1);
        assert_eq!(counts.get(1), 0);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn test_count_requires_integer_dimension() {
        let cloud = classified(&[1.0]);
        let err = count_occurrences(&cloud, &Dimension::Extra("h".to_string())).unwrap_err();
        assert!(matches!(err, OpsError::UnknownDimension(_)));
    }

    #[test]
    fn test_count_files() {
        let codec = MemoryCodec::new();
        codec.insert("/a.laz", classified(&[1.0, 2.0]));
        codec.insert("/b.laz", classified(&[2.0, 2.0, 9.0]));
        let counts = count_files(
            &[PathBuf::from("/a.laz"), PathBuf::from("/b.laz")],
            &Dimension::Classification,
            &codec,
        )
        .unwrap();
        assert_eq!(counts.iter().collect::<Vec<_>>(), vec![(1, 1), (2, 3), (9, 1)]);
    }

    #[test]
    fn test_json_round_trip_and_merge() {
        let dir = TempDir::new().unwrap();
        let mut a = OccurrenceCounts::new();
        a.add(2, 10);
        a.add(6, 1);
        let mut b = OccurrenceCounts::new();
        b.add(2, 5);

        let (pa, pb) = (dir.path().join("a.json"), dir.path().join("b.json"));
        a.save(&pa).unwrap();
        b.save(&pb).unwrap();
        assert!(fs::read_to_string(&pa).unwrap().contains("\"2\": 10"));

        let merged = merge_count_files(&[pa, pb]).unwrap();
        assert_eq!(merged.get(2), 15);
        assert_eq!(merged.get(6), 1);
    }

    #[test]
    fn test_replacement_map_refuses_duplicates() {
        let targets = BTreeMap::from([(1, vec![2, 3]), (4, vec![3])]);
        let err = ReplacementMap::new(targets).unwrap_err();
        assert!(matches!(err, OpsError::DuplicateSource { value: 3, count: 2 }));
    }

    #[test]
    fn test_replace_does_not_chain() {
        let mut cloud = classified(&[1.0, 2.0, 3.0, 5.0]);
        let map = ReplacementMap::new(BTreeMap::from([(2, vec![1]), (3, vec![2])])).unwrap();
        let changed = replace_occurrences(&mut cloud, &Dimension::Classification, &map).unwrap();
        assert_eq!(changed, 2);
        let classes: Vec<_> = (0..4)
            .map(|i| cloud.value(i, &Dimension::Classification).unwrap())
            .collect();
        assert_eq!(
            classes,
            vec![Value::U8(2), Value::U8(3), Value::U8(3), Value::U8(5)]
        );
    }

    #[test]
    fn test_replace_out_of_range() {
        let mut cloud = classified(&[1.0]);
        let map = ReplacementMap::new(BTreeMap::from([(300, vec![1])])).unwrap();
        let err = replace_occurrences(&mut cloud, &Dimension::Classification, &map).unwrap_err();
        assert!(matches!(err, OpsError::ValueOutOfRange { value: 300, .. }));
    }

    #[test]
    fn test_load_replacement_map() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("map.json");
        fs::write(&path, r#"{"1": [2, 3], "6": [64]}"#).unwrap();
        let map = ReplacementMap::load(&path).unwrap();
        assert_eq!(map.target(3), Some(1));
        assert_eq!(map.target(64), Some(6));
        assert_eq!(map.target(1), None);
    }
}
