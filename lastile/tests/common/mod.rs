//! Fixtures shared by the integration tests.

#![allow(dead_code)]

use lastile::cloud::{CrsRecord, Dimension, Point, PointCloud, Schema, Value};
use lastile::codec::srs::PROJECTION_USER_ID;
use lastile::codec::{LasCodec, PointCloudCodec, WriteOptions};
use std::path::{Path, PathBuf};

/// GeoKey directory declaring EPSG:2154.
pub fn geo_keys_2154() -> CrsRecord {
    let words: [u16; 8] = [1, 1, 0, 1, 3072, 0, 1, 2154];
    CrsRecord {
        user_id: PROJECTION_USER_ID.to_string(),
        record_id: 34735,
        description: "GeoKeyDirectoryTag".to_string(),
        data: words.iter().flat_map(|w| w.to_le_bytes()).collect(),
    }
}

/// Cloud with intensity, classification and GPS time; intensity numbers
/// the points.
pub fn tile_cloud(coords: &[(f64, f64, f64)]) -> PointCloud {
    let schema = Schema::native(&[
        Dimension::Intensity,
        Dimension::Classification,
        Dimension::GpsTime,
    ]);
    let mut cloud = PointCloud::new(schema);
    cloud.header_mut().crs.push(geo_keys_2154());
    for (i, &(x, y, z)) in coords.iter().enumerate() {
        cloud.push(Point::new(
            x,
            y,
            z,
            vec![Value::U16(i as u16), Value::U8(2), Value::F64(1000.0 + i as f64)],
        ));
    }
    cloud
}

/// Writes `cloud` as `name` in `dir` and returns the path.
pub fn write_tile(dir: &Path, name: &str, cloud: &PointCloud) -> PathBuf {
    let path = dir.join(name);
    LasCodec::new()
        .write(cloud, &path, &WriteOptions::new())
        .unwrap();
    path
}

pub fn coordinates(cloud: &PointCloud) -> Vec<(f64, f64, f64)> {
    cloud.points().iter().map(|p| (p.x, p.y, p.z)).collect()
}

pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
