//! Point colorization from orthoimagery.
//!
//! [`colorize`] samples a [`Mosaic`] at every point and stores the bands in
//! color dimensions. [`Colorizer`] runs the whole file workflow: extent
//! resolution, mosaic fetch for each imagery layer, sampling and writing.

mod pipeline;

pub use pipeline::{ColorSummary, ColorizeConfig, Colorizer, ImageryKind, LayerReport};

use std::path::PathBuf;
use thiserror::Error;
use tracing::warn;

use crate::cloud::{Dimension, PointCloud, Value};
use crate::raster::Mosaic;

/// Factor from 8-bit image values to the 16-bit LAS color range.
pub const COLOR_SCALE: f64 = 256.0;

/// Share of white samples above which imagery is reported as suspicious.
pub const WHITE_RATIO_LIMIT: f64 = 0.95;

/// Errors raised by colorization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// The imagery is blank over the tile and images are checked
    #[error("imagery of layer {layer} is blank over {}", .path.display())]
    BlankImagery { layer: String, path: PathBuf },

    #[error("cannot determine the EPSG code of {}: set it explicitly", .path.display())]
    UnknownCrs { path: PathBuf },

    #[error("no imagery layer to colorize from")]
    NoLayer,
}

/// Which image channel feeds which dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BandMapping {
    bands: Vec<(Dimension, usize)>,
}

impl BandMapping {
    pub fn new(bands: Vec<(Dimension, usize)>) -> Self {
        Self { bands }
    }

    /// Red, green and blue from the first three channels.
    pub fn rgb() -> Self {
        Self::new(vec![
            (Dimension::Red, 0),
            (Dimension::Green, 1),
            (Dimension::Blue, 2),
        ])
    }

    /// Near infrared from the first channel of a false-color (IRC) image.
    pub fn infrared() -> Self {
        Self::new(vec![(Dimension::Infrared, 0)])
    }

    pub fn bands(&self) -> &[(Dimension, usize)] {
        &self.bands
    }
}

/// Statistics of the samples taken by [`colorize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorReport {
    pub points: usize,
    /// Points in blocks the imagery service had no data for
    pub no_data_points: usize,
    /// Points whose pixel is pure white
    pub white_points: usize,
    /// Mean sampled value of each image channel
    pub mean: [f64; 3],
}

impl ColorReport {
    pub fn white_ratio(&self) -> f64 {
        if self.points == 0 {
            0.0
        } else {
            self.white_points as f64 / self.points as f64
        }
    }

    /// Whether the samples look like missing imagery rather than a picture.
    pub fn is_suspicious(&self) -> bool {
        self.points > 0
            && (self.no_data_points == self.points || self.white_ratio() >= WHITE_RATIO_LIMIT)
    }
}

/// Samples `mosaic` at each point and sets the mapped dimensions.
///
/// The pixel of a point is the offset from the mosaic north-west corner
/// divided by the resolution, clamped to the image. Values are stored as
/// `channel * 256`. Mapped dimensions missing from the cloud are added.
/// Suspicious samples (white or no-data imagery) are logged as a warning.
pub fn colorize(
    mut cloud: PointCloud,
    mosaic: &Mosaic,
    mapping: &BandMapping,
) -> (PointCloud, ColorReport) {
    let columns: Vec<(usize, usize)> = mapping
        .bands()
        .iter()
        .map(|(dimension, channel)| (cloud.ensure_dimension(dimension.clone()), (*channel).min(2)))
        .collect();
    let kinds: Vec<_> = columns
        .iter()
        .map(|(column, _)| cloud.schema().at(*column).kind)
        .collect();

    let mut report = ColorReport {
        points: cloud.len(),
        ..ColorReport::default()
    };
    let mut sums = [0.0f64; 3];

    let samples: Vec<_> = cloud
        .points()
        .iter()
        .map(|p| (mosaic.sample(p.x, p.y), mosaic.is_no_data(p.x, p.y)))
        .collect();
    for (point, (pixel, no_data)) in cloud.points_mut().iter_mut().zip(samples) {
        for ((column, channel), kind) in columns.iter().zip(&kinds) {
            point.values[*column] = Value::from_f64(*kind, pixel.0[*channel] as f64 * COLOR_SCALE);
        }
        if no_data {
            report.no_data_points += 1;
        }
        if pixel.0 == [255, 255, 255] {
            report.white_points += 1;
        }
        for (sum, value) in sums.iter_mut().zip(pixel.0) {
            *sum += value as f64;
        }
    }

    if report.points > 0 {
        report.mean = sums.map(|s| s / report.points as f64);
    }
    if report.is_suspicious() {
        warn!(
            points = report.points,
            white = report.white_points,
            no_data = report.no_data_points,
            "Imagery looks blank over the cloud"
        );
    }
    (cloud, report)
}
