//! Removal of the buffer points of a buffered tile.

use thiserror::Error;

use crate::cloud::{PointCloud, Provenance};

/// The cloud carries no buffer provenance.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("point cloud has no buffer mark: it was not produced by buffer assembly")]
pub struct MissingBufferMarkError;

/// Keeps the tile points of a buffered cloud.
///
/// The result is no longer buffer-marked.
pub fn strip(mut cloud: PointCloud) -> Result<PointCloud, MissingBufferMarkError> {
    if !cloud.is_buffer_marked() {
        return Err(MissingBufferMarkError);
    }
    cloud.retain(|p| p.provenance == Provenance::Tile);
    cloud.set_buffer_marked(false);
    Ok(cloud)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::testing::cloud_with;

    #[test]
    fn test_unmarked_cloud_is_rejected() {
        let cloud = cloud_with(&[(0.0, 0.0, 0.0)]);
        assert_eq!(strip(cloud), Err(MissingBufferMarkError));
    }

    #[test]
    fn test_keeps_tile_points_in_order() {
        let mut cloud = cloud_with(&[(0.0, 0.0, 0.0), (1.0, 0.0, 0.0), (2.0, 0.0, 0.0)]);
        cloud.set_buffer_marked(true);
        let mut points = cloud.clone().into_points();
        points[1].provenance = Provenance::Buffer;
        let mut marked = PointCloud::with_header(cloud.header().clone(), cloud.schema().clone());
        marked.extend_aligned(points);
        marked.set_buffer_marked(true);

        let stripped = strip(marked).unwrap();
        let xs: Vec<f64> = stripped.points().iter().map(|p| p.x).collect();
        assert_eq!(xs, vec![0.0, 2.0]);
        assert!(!stripped.is_buffer_marked());
    }
}
