//! Comparison of two point clouds.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, instrument};

use super::is_coordinate;
use crate::cloud::{Dimension, Point, PointCloud};
use crate::codec::PointCloudCodec;
use crate::error::TileError;

/// What to compare.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompareOptions {
    /// Dimension names; `None` compares every dimension
    pub dimensions: Option<Vec<String>>,
    /// Absolute tolerance per dimension name, exact comparison otherwise
    pub tolerance: BTreeMap<String, f64>,
}

impl CompareOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimensions(mut self, dimensions: Vec<String>) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn with_tolerance(mut self, dimension: impl Into<String>, tolerance: f64) -> Self {
        self.tolerance.insert(dimension.into(), tolerance.abs());
        self
    }
}

/// Why two clouds cannot be compared point by point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    PointCount { left: usize, right: usize },
    /// The dimension sets differ and no dimension list was given
    Dimensions {
        only_left: Vec<String>,
        only_right: Vec<String>,
    },
    MissingDimension(String),
}

/// Result of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub identical: bool,
    /// Points differing in at least one compared dimension
    pub differing_points: usize,
    /// `differing_points` as a percentage of the point count
    pub percentage: f64,
    pub mismatch: Option<Mismatch>,
}

impl Comparison {
    fn mismatch(mismatch: Mismatch) -> Self {
        Self {
            identical: false,
            differing_points: 0,
            percentage: 0.0,
            mismatch: Some(mismatch),
        }
    }
}

/// Compares two clouds dimension by dimension.
///
/// Both clouds are first sorted by GPS time, then x, y and z, so that
/// files holding the same points in another order compare equal. The
/// coordinates are compared under the names `X`, `Y` and `Z`.
pub fn compare(left: &PointCloud, right: &PointCloud, options: &CompareOptions) -> Comparison {
    if left.len() != right.len() {
        return Comparison::mismatch(Mismatch::PointCount {
            left: left.len(),
            right: right.len(),
        });
    }

    let left_names = dimension_names(left);
    let right_names = dimension_names(right);
    let dimensions = match &options.dimensions {
        Some(list) => {
            if let Some(missing) = list
                .iter()
                .find(|d| !left_names.contains(d) || !right_names.contains(d))
            {
                return Comparison::mismatch(Mismatch::MissingDimension(missing.clone()));
            }
            list.clone()
        }
        None => {
            if left_names != right_names {
                return Comparison::mismatch(Mismatch::Dimensions {
                    only_left: difference(&left_names, &right_names),
                    only_right: difference(&right_names, &left_names),
                });
            }
            left_names
        }
    };

    let left_order = sorted_order(left);
    let right_order = sorted_order(right);

    let mut differs = vec![false; left.len()];
    for name in &dimensions {
        let tolerance = options.tolerance.get(name).copied().unwrap_or(0.0);
        let mut count = 0;
        for (rank, (&i, &j)) in left_order.iter().zip(&right_order).enumerate() {
            let a = value_of(left, i, name);
            let b = value_of(right, j, name);
            if (a - b).abs() > tolerance || (a.is_nan() != b.is_nan()) {
                differs[rank] = true;
                count += 1;
            }
        }
        if count > 0 {
            debug!(dimension = %name, points = count, tolerance, "Dimension differs");
        }
    }

    let differing_points = differs.iter().filter(|d| **d).count();
    let percentage = if left.is_empty() {
        0.0
    } else {
        100.0 * differing_points as f64 / left.len() as f64
    };
    Comparison {
        identical: differing_points == 0,
        differing_points,
        percentage,
        mismatch: None,
    }
}

/// Compares two files.
#[instrument(level = "debug", skip_all, fields(left = %left.display(), right = %right.display()))]
pub fn compare_files<C: PointCloudCodec + ?Sized>(
    left: &Path,
    right: &Path,
    options: &CompareOptions,
    codec: &C,
) -> Result<Comparison, TileError> {
    let comparison = compare(&codec.read(left)?, &codec.read(right)?, options);
    info!(
        identical = comparison.identical,
        differing = comparison.differing_points,
        percentage = comparison.percentage,
        "Compared files"
    );
    Ok(comparison)
}

/// Coordinate names then attribute names, sorted.
fn dimension_names(cloud: &PointCloud) -> Vec<String> {
    let mut names: Vec<String> = crate::cloud::COORDINATE_NAMES
        .iter()
        .map(|s| s.to_string())
        .chain(cloud.schema().iter().map(|d| d.dimension.name().to_string()))
        .collect();
    names.sort();
    names
}

fn difference(a: &[String], b: &[String]) -> Vec<String> {
    a.iter().filter(|n| !b.contains(n)).cloned().collect()
}

fn value_of(cloud: &PointCloud, index: usize, name: &str) -> f64 {
    let point = &cloud.points()[index];
    if is_coordinate(name) {
        return match name.to_ascii_uppercase().as_str() {
            "X" => point.x,
            "Y" => point.y,
            _ => point.z,
        };
    }
    cloud
        .value(index, &Dimension::from_name(name))
        .map(|v| v.as_f64())
        .unwrap_or(f64::NAN)
}

/// Indices of the points sorted by (gps_time, x, y, z).
fn sorted_order(cloud: &PointCloud) -> Vec<usize> {
    let gps_column = cloud.schema().index_of(&Dimension::GpsTime);
    let key = |p: &Point| -> [f64; 4] {
        let time = gps_column.map(|c| p.values[c].as_f64()).unwrap_or(0.0);
        [time, p.x, p.y, p.z]
    };

    let points = cloud.points();
    let mut order: Vec<usize> = (0..points.len()).collect();
    order.sort_by(|&a, &b| {
        let (ka, kb) = (key(&points[a]), key(&points[b]));
        ka.iter()
            .zip(&kb)
            .map(|(x, y)| x.total_cmp(y))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    order
}
