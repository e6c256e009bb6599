//! In-memory point cloud model.
//!
//! A [`PointCloud`] owns its points; attribute values are stored per point in
//! the order of the cloud [`Schema`]. Operations that combine clouds (buffer
//! assembly, merge) always build a new cloud holding copies of the points.

mod dimension;
mod point;
mod schema;

pub use dimension::{Dimension, Value, ValueKind, COORDINATE_NAMES};
pub use point::{Point, Provenance};
pub use schema::{DimensionDef, Schema, SchemaConflictError};

use crate::extent::Extent;

/// Default coordinate scale factor (centimeter precision).
pub const DEFAULT_SCALE: f64 = 0.01;

/// A coordinate reference system record carried through unchanged
/// (GeoKey directory, GeoTIFF parameters, OGC WKT).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrsRecord {
    pub user_id: String,
    pub record_id: u16,
    pub description: String,
    pub data: Vec<u8>,
}

/// File-level metadata of a cloud.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudHeader {
    /// Coordinate scale factors (x, y, z)
    pub scale: [f64; 3],
    /// Coordinate offsets (x, y, z)
    pub offset: [f64; 3],
    /// Coordinate reference system records
    pub crs: Vec<CrsRecord>,
    /// Planimetric bounds declared by the source file
    pub bounds: Option<Extent>,
}

impl Default for CloudHeader {
    fn default() -> Self {
        Self {
            scale: [DEFAULT_SCALE; 3],
            offset: [0.0; 3],
            crs: Vec::new(),
            bounds: None,
        }
    }
}

/// An ordered set of points sharing a schema.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCloud {
    header: CloudHeader,
    schema: Schema,
    points: Vec<Point>,
    buffer_marked: bool,
}

impl PointCloud {
    /// Creates an empty cloud with a default header.
    pub fn new(schema: Schema) -> Self {
        Self::with_header(CloudHeader::default(), schema)
    }

    pub fn with_header(header: CloudHeader, schema: Schema) -> Self {
        Self {
            header,
            schema,
            points: Vec::new(),
            buffer_marked: false,
        }
    }

    pub fn header(&self) -> &CloudHeader {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut CloudHeader {
        &mut self.header
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Points with mutable values; the schema cannot change through it.
    pub(crate) fn points_mut(&mut self) -> &mut [Point] {
        &mut self.points
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the points carry buffer provenance (output of buffer assembly).
    pub fn is_buffer_marked(&self) -> bool {
        self.buffer_marked
    }

    pub(crate) fn set_buffer_marked(&mut self, marked: bool) {
        self.buffer_marked = marked;
    }

    /// Appends a point.
    ///
    /// Missing trailing values are filled with the schema defaults and
    /// surplus values are dropped.
    pub fn push(&mut self, mut point: Point) {
        let expected = self.schema.len();
        if point.values.len() != expected {
            point.values.truncate(expected);
            let defaults = self.schema.defaults();
            point
                .values
                .extend_from_slice(&defaults[point.values.len()..]);
        }
        self.points.push(point);
    }

    /// Value of `dimension` for the point at `index`.
    pub fn value(&self, index: usize, dimension: &Dimension) -> Option<Value> {
        let column = self.schema.index_of(dimension)?;
        self.points.get(index).map(|p| p.values[column])
    }

    /// Sets a value, converting it to the column kind.
    ///
    /// Returns `false` when the point or the dimension does not exist.
    pub fn set_value(&mut self, index: usize, dimension: &Dimension, value: f64) -> bool {
        let Some(column) = self.schema.index_of(dimension) else {
            return false;
        };
        let kind = self.schema.at(column).kind;
        match self.points.get_mut(index) {
            Some(point) => {
                point.values[column] = Value::from_f64(kind, value);
                true
            }
            None => false,
        }
    }

    /// Adds a column filled with its default value.
    ///
    /// Returns the column index; an existing column with the same kind is
    /// reused.
    pub fn add_dimension(&mut self, def: DimensionDef) -> Result<usize, SchemaConflictError> {
        let before = self.schema.len();
        let default = def.default;
        let index = self.schema.push(def)?;
        if index == before {
            for point in &mut self.points {
                point.values.push(default);
            }
        }
        Ok(index)
    }

    /// Column index of `dimension`, adding it with its native kind when
    /// missing.
    pub fn ensure_dimension(&mut self, dimension: Dimension) -> usize {
        if let Some(index) = self.schema.index_of(&dimension) {
            return index;
        }
        let def = DimensionDef::native(dimension);
        let default = def.default;
        self.schema.append(def);
        for point in &mut self.points {
            point.values.push(default);
        }
        self.schema.len() - 1
    }

    /// Removes a column. Returns `false` when it does not exist.
    pub fn remove_dimension(&mut self, dimension: &Dimension) -> bool {
        let Some(index) = self.schema.index_of(dimension) else {
            return false;
        };
        self.schema.remove_at(index);
        for point in &mut self.points {
            point.values.remove(index);
        }
        true
    }

    pub(crate) fn rename_dimension_at(&mut self, index: usize, dimension: Dimension) {
        self.schema.rename_at(index, dimension);
    }

    /// Rebuilds the cloud on another schema.
    ///
    /// Columns missing from the cloud take their default value, columns
    /// absent from `schema` are dropped, and a column present in both with a
    /// different kind is a conflict.
    pub fn conform_to(self, schema: &Schema) -> Result<PointCloud, SchemaConflictError> {
        if &self.schema == schema {
            return Ok(self);
        }

        let mut mapping = Vec::with_capacity(schema.len());
        for def in schema.iter() {
            match self.schema.get(&def.dimension) {
                Some(own) if own.kind != def.kind => {
                    return Err(SchemaConflictError {
                        dimension: def.dimension.name().to_string(),
                        existing: def.kind,
                        incoming: own.kind,
                    });
                }
                Some(_) => mapping.push(self.schema.index_of(&def.dimension)),
                None => mapping.push(None),
            }
        }

        let defaults = schema.defaults();
        let points = self
            .points
            .into_iter()
            .map(|p| {
                let values = mapping
                    .iter()
                    .zip(&defaults)
                    .map(|(source, default)| source.map(|i| p.values[i]).unwrap_or(*default))
                    .collect();
                Point { values, ..p }
            })
            .collect();

        Ok(PointCloud {
            header: self.header,
            schema: schema.clone(),
            points,
            buffer_marked: self.buffer_marked,
        })
    }

    /// Keeps the points matching `keep`.
    pub fn retain<F: FnMut(&Point) -> bool>(&mut self, keep: F) {
        self.points.retain(keep);
    }

    /// Appends points already aligned on this cloud schema.
    pub(crate) fn extend_aligned<I: IntoIterator<Item = Point>>(&mut self, points: I) {
        self.points.extend(points);
    }

    /// Planimetric bounds of the points, `None` when empty.
    pub fn bounds(&self) -> Option<Extent> {
        let first = self.points.first()?;
        let mut extent = Extent::point(first.x, first.y);
        for p in &self.points[1..] {
            extent.include(p.x, p.y);
        }
        Some(extent)
    }

    /// Vertical range of the points, `None` when empty.
    pub fn z_range(&self) -> Option<(f64, f64)> {
        self.points.iter().fold(None, |acc, p| match acc {
            None => Some((p.z, p.z)),
            Some((lo, hi)) => Some((lo.min(p.z), hi.max(p.z))),
        })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Cloud builders shared by unit tests.

    use super::*;

    /// Schema with intensity and classification.
    pub fn basic_schema() -> Schema {
        Schema::native(&[Dimension::Intensity, Dimension::Classification])
    }

    /// Cloud of points with intensity `i` and classification 2.
    pub fn cloud_with(coords: &[(f64, f64, f64)]) -> PointCloud {
        let mut cloud = PointCloud::new(basic_schema());
        for (i, &(x, y, z)) in coords.iter().enumerate() {
            cloud.push(Point::new(
                x,
                y,
                z,
                vec![Value::U16(i as u16), Value::U8(2)],
            ));
        }
        cloud
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_push_pads_missing_values() {
        let mut cloud = PointCloud::new(Schema::native(&[
            Dimension::Intensity,
            Dimension::ReturnNumber,
        ]));
        cloud.push(Point::new(0.0, 0.0, 0.0, vec![Value::U16(9)]));
        assert_eq!(cloud.points()[0].values, vec![Value::U16(9), Value::U8(1)]);
    }

    #[test]
    fn test_add_dimension_fills_defaults() {
        let mut cloud = cloud_with(&[(0.0, 0.0, 0.0), (1.0, 1.0, 1.0)]);
        let index = cloud
            .add_dimension(DimensionDef::native(Dimension::Red))
            .unwrap();
        assert_eq!(index, 2);
        assert!(cloud.points().iter().all(|p| p.values[2] == Value::U16(0)));
    }

    #[test]
    fn test_ensure_dimension() {
        let mut cloud = cloud_with(&[(0.0, 0.0, 0.0)]);
        assert_eq!(cloud.ensure_dimension(Dimension::Classification), 1);
        assert_eq!(cloud.ensure_dimension(Dimension::Infrared), 2);
        assert_eq!(cloud.ensure_dimension(Dimension::Infrared), 2);
        assert_eq!(cloud.points()[0].values[2], Value::U16(0));
    }

    #[test]
    fn test_remove_dimension() {
        let mut cloud = cloud_with(&[(0.0, 0.0, 0.0)]);
        assert!(cloud.remove_dimension(&Dimension::Intensity));
        assert!(!cloud.remove_dimension(&Dimension::Intensity));
        assert_eq!(cloud.points()[0].values, vec![Value::U8(2)]);
    }

    #[test]
    fn test_set_value_converts_to_column_kind() {
        let mut cloud = cloud_with(&[(0.0, 0.0, 0.0)]);
        assert!(cloud.set_value(0, &Dimension::Classification, 6.0));
        assert_eq!(cloud.value(0, &Dimension::Classification), Some(Value::U8(6)));
        assert!(!cloud.set_value(0, &Dimension::Red, 1.0));
        assert!(!cloud.set_value(3, &Dimension::Classification, 1.0));
    }

    #[test]
    fn test_conform_to_drops_and_defaults() {
        let cloud = cloud_with(&[(0.0, 0.0, 0.0)]);
        let target = Schema::native(&[Dimension::Classification, Dimension::UserData]);
        let conformed = cloud.conform_to(&target).unwrap();
        assert_eq!(conformed.points()[0].values, vec![Value::U8(2), Value::U8(0)]);
    }

    #[test]
    fn test_conform_to_detects_conflicts() {
        let mut cloud = PointCloud::new(Schema::new());
        cloud
            .add_dimension(DimensionDef::new(
                Dimension::Extra("h".to_string()),
                ValueKind::F32,
            ))
            .unwrap();
        let mut target = Schema::new();
        target
            .push(DimensionDef::new(Dimension::Extra("h".to_string()), ValueKind::F64))
            .unwrap();
        assert!(cloud.conform_to(&target).is_err());
    }

    #[test]
    fn test_bounds() {
        let cloud = cloud_with(&[(1.0, 5.0, 0.0), (3.0, 2.0, 9.0)]);
        assert_eq!(cloud.bounds(), Some(Extent::new(1.0, 2.0, 3.0, 5.0)));
        assert_eq!(cloud.z_range(), Some((0.0, 9.0)));
        assert_eq!(PointCloud::default().bounds(), None);
    }
}
