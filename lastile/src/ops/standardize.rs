//! Conversion to the distribution format of the tiles.

use std::path::Path;
use tracing::{info, instrument};

use super::OpsError;
use crate::cloud::{Dimension, PointCloud, DEFAULT_SCALE};
use crate::codec::{PointCloudCodec, WriteOptions};
use crate::error::TileError;

/// Point formats accepted for standardized tiles.
pub const STANDARD_FORMATS: [u8; 2] = [6, 8];

/// Brings a cloud to the distribution layout.
///
/// Extra dimensions and the buffer mark are dropped, coordinates get a
/// centimeter scale and an offset at the floor of the minimum coordinates.
/// CRS records are kept.
pub fn standardize(mut cloud: PointCloud) -> PointCloud {
    let extras: Vec<Dimension> = cloud
        .schema()
        .extras()
        .map(|d| d.dimension.clone())
        .collect();
    for dimension in &extras {
        cloud.remove_dimension(dimension);
    }
    cloud.set_buffer_marked(false);

    let offset = minimum_coordinates(&cloud).map(|m| m.map(f64::floor));
    let header = cloud.header_mut();
    header.scale = [DEFAULT_SCALE; 3];
    header.offset = offset.unwrap_or([0.0; 3]);
    cloud
}

fn minimum_coordinates(cloud: &PointCloud) -> Option<[f64; 3]> {
    let (z_min, _) = cloud.z_range()?;
    let bounds = cloud.bounds()?;
    Some([bounds.xmin, bounds.ymin, z_min])
}

/// Writes a standardized, compressed copy of `input`. Returns the number of
/// points written.
#[instrument(level = "debug", skip_all, fields(input = %input.display(), format = format))]
pub fn standardize_file<C: PointCloudCodec + ?Sized>(
    input: &Path,
    output: &Path,
    format: u8,
    codec: &C,
) -> Result<usize, TileError> {
    if !STANDARD_FORMATS.contains(&format) {
        return Err(OpsError::UnsupportedFormat(format).into());
    }

    let cloud = standardize(codec.read(input)?);
    let options = WriteOptions::new()
        .with_point_format(format)
        .with_compression(true);
    codec.write(&cloud, output, &options)?;
    info!(output = %output.display(), points = cloud.len(), format, "Standardized tile");
    Ok(cloud.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::testing::cloud_with;
    use crate::cloud::{CrsRecord, DimensionDef, ValueKind};
    use crate::codec::MemoryCodec;

    fn messy_cloud() -> PointCloud {
        let mut cloud = cloud_with(&[(1000.27, 6000.9, -3.5), (1500.0, 6200.0, 80.0)]);
        cloud
            .add_dimension(DimensionDef::new(
                Dimension::Extra("height".to_string()),
                ValueKind::F64,
            ))
            .unwrap();
        cloud.set_buffer_marked(true);
        let header = cloud.header_mut();
        header.scale = [0.001; 3];
        header.crs.push(CrsRecord {
            user_id: "LASF_Projection".to_string(),
            record_id: 2112,
            description: String::new(),
            data: b"PROJCS[]".to_vec(),
        });
        cloud
    }

    #[test]
    fn test_standardize_layout() {
        let cloud = standardize(messy_cloud());
        assert_eq!(cloud.schema().extras().count(), 0);
        assert!(!cloud.is_buffer_marked());
        assert_eq!(cloud.header().scale, [0.01; 3]);
        assert_eq!(cloud.header().offset, [1000.0, 6000.0, -4.0]);
        assert_eq!(cloud.header().crs.len(), 1);
        assert_eq!(cloud.len(), 2);
    }

    #[test]
    fn test_standardize_empty_cloud() {
        let cloud = standardize(PointCloud::default());
        assert_eq!(cloud.header().offset, [0.0; 3]);
    }

    #[test]
    fn test_standardize_file_rejects_format() {
        let codec = MemoryCodec::new();
        codec.insert("/in.laz", messy_cloud());
        let err = standardize_file(Path::new("/in.laz"), Path::new("/out.laz"), 7, &codec)
            .unwrap_err();
        assert!(matches!(err, TileError::Ops(OpsError::UnsupportedFormat(7))));
        assert!(codec.get(Path::new("/out.laz")).is_none());
    }

    #[test]
    fn test_standardize_file() {
        let codec = MemoryCodec::new();
        codec.insert("/in.laz", messy_cloud());
        let written =
            standardize_file(Path::new("/in.laz"), Path::new("/out.laz"), 6, &codec).unwrap();
        assert_eq!(written, 2);
        let out = codec.get(Path::new("/out.laz")).unwrap();
        assert_eq!(out.schema().len(), 2);
    }
}
