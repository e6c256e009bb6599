//! Cropping to a 2D bounding box.

use std::path::Path;
use tracing::{info, instrument};

use super::OpsError;
use crate::buffer::crop;
use crate::cloud::PointCloud;
use crate::codec::{PointCloudCodec, WriteOptions};
use crate::error::TileError;
use crate::extent::Extent;

/// Outcome of [`clip_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipSummary {
    pub kept: usize,
    pub removed: usize,
}

/// Checks that `bounds` is a finite, well-ordered box.
pub fn checked_bounds(bounds: Extent) -> Result<Extent, OpsError> {
    let finite = [bounds.xmin, bounds.ymin, bounds.xmax, bounds.ymax]
        .iter()
        .all(|v| v.is_finite());
    if !finite || bounds.xmin > bounds.xmax || bounds.ymin > bounds.ymax {
        return Err(OpsError::InvalidBounds(bounds));
    }
    Ok(bounds)
}

/// Keeps the points of `cloud` inside `bounds`, edges included.
///
/// Header, schema, CRS records and buffer mark are unchanged.
pub fn clip(cloud: PointCloud, bounds: &Extent) -> Result<PointCloud, OpsError> {
    let bounds = checked_bounds(*bounds)?;
    Ok(crop(cloud, &bounds))
}

/// Writes the points of `input` inside `bounds` to `output`.
#[instrument(level = "debug", skip_all, fields(input = %input.display()))]
pub fn clip_file<C: PointCloudCodec + ?Sized>(
    input: &Path,
    output: &Path,
    bounds: &Extent,
    codec: &C,
    options: &WriteOptions,
) -> Result<ClipSummary, TileError> {
    let bounds = checked_bounds(*bounds)?;
    let cloud = codec.read(input)?;
    let total = cloud.len();
    let clipped = crop(cloud, &bounds);
    codec.write(&clipped, output, options)?;

    let summary = ClipSummary {
        kept: clipped.len(),
        removed: total - clipped.len(),
    };
    info!(
        output = %output.display(),
        kept = summary.kept,
        removed = summary.removed,
        "Clipped tile"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::testing::cloud_with;
    use crate::codec::MemoryCodec;

    /// Raw box, without the ordering applied by [`Extent::new`].
    fn bounds(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Extent {
        Extent {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    #[test]
    fn test_clip_keeps_points_on_the_edges() {
        let cloud = cloud_with(&[
            (10.0, 10.0, 0.0),
            (20.0, 15.0, 1.0),
            (20.01, 15.0, 2.0),
            (15.0, 9.99, 3.0),
        ]);

        let clipped = clip(cloud, &bounds(10.0, 10.0, 20.0, 20.0)).unwrap();
        let xs: Vec<f64> = clipped.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![10.0, 20.0]);
    }

    #[test]
    fn test_degenerate_box_keeps_a_line() {
        let cloud = cloud_with(&[(5.0, 1.0, 0.0), (5.0, 3.0, 0.0), (6.0, 2.0, 0.0)]);
        let clipped = clip(cloud, &bounds(5.0, 0.0, 5.0, 10.0)).unwrap();
        assert_eq!(clipped.len(), 2);
    }

    #[test]
    fn test_reversed_or_nan_bounds_are_rejected() {
        let cloud = cloud_with(&[(0.0, 0.0, 0.0)]);
        assert!(matches!(
            clip(cloud.clone(), &bounds(10.0, 0.0, 0.0, 10.0)),
            Err(OpsError::InvalidBounds(_))
        ));
        assert!(matches!(
            clip(cloud, &bounds(0.0, f64::NAN, 10.0, 10.0)),
            Err(OpsError::InvalidBounds(_))
        ));
    }

    #[test]
    fn test_clip_file_reports_counts() {
        let codec = MemoryCodec::new();
        codec.insert(
            "/in.laz",
            cloud_with(&[(1.0, 1.0, 0.0), (2.0, 2.0, 0.0), (50.0, 50.0, 0.0)]),
        );

        let summary = clip_file(
            Path::new("/in.laz"),
            Path::new("/out.laz"),
            &bounds(0.0, 0.0, 10.0, 10.0),
            &codec,
            &WriteOptions::new(),
        )
        .unwrap();

        assert_eq!(summary, ClipSummary { kept: 2, removed: 1 });
        assert_eq!(codec.get(Path::new("/out.laz")).unwrap().len(), 2);
    }

    #[test]
    fn test_clip_file_with_invalid_bounds_writes_nothing() {
        let codec = MemoryCodec::new();
        codec.insert("/in.laz", cloud_with(&[(1.0, 1.0, 0.0)]));

        let result = clip_file(
            Path::new("/in.laz"),
            Path::new("/out.laz"),
            &bounds(0.0, 5.0, 10.0, 1.0),
            &codec,
            &WriteOptions::new(),
        );

        assert!(matches!(
            result,
            Err(TileError::Ops(OpsError::InvalidBounds(_)))
        ));
        assert!(codec.get(Path::new("/out.laz")).is_none());
    }
}
