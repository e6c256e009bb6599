//! LAS/LAZ codec on top of the `las` crate.

use las::point::{Classification, Format, ScanDirection};
use las::{Builder, Color, Transform, Vector, Vlr};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::extra_bytes::{self, ExtraField, EXTRA_BYTES_RECORD_ID, EXTRA_BYTES_USER_ID};
use super::srs::is_crs_record;
use super::{auto_point_format, CodecError, PointCloudCodec, WriteOptions, BUFFER_MARK_DIMENSION};
use crate::cloud::{
    CloudHeader, CrsRecord, Dimension, DimensionDef, Point, PointCloud, Provenance, Schema, Value,
    ValueKind,
};
use crate::extent::Extent;

/// Software name written in the headers of produced files.
const GENERATING_SOFTWARE: &str = concat!("lastile ", env!("CARGO_PKG_VERSION"));

/// Attributes present in every LAS point record.
const RECORD_DIMENSIONS: [Dimension; 14] = [
    Dimension::Intensity,
    Dimension::ReturnNumber,
    Dimension::NumberOfReturns,
    Dimension::ScanDirectionFlag,
    Dimension::EdgeOfFlightLine,
    Dimension::Classification,
    Dimension::Synthetic,
    Dimension::KeyPoint,
    Dimension::Withheld,
    Dimension::Overlap,
    Dimension::ScanChannel,
    Dimension::ScanAngleRank,
    Dimension::UserData,
    Dimension::PointSourceId,
];

/// Codec for LAS and LAZ files.
///
/// Written files are LAS 1.4; the point format is chosen from the cloud
/// attributes unless forced through [`WriteOptions`]. Extra dimensions are
/// stored as extra bytes, along with the buffer provenance flag of
/// buffer-marked clouds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LasCodec;

impl LasCodec {
    pub fn new() -> Self {
        Self
    }
}

impl PointCloudCodec for LasCodec {
    fn read(&self, path: &Path) -> Result<PointCloud, CodecError> {
        let read_error = |source| CodecError::Read {
            path: path.to_path_buf(),
            source,
        };

        let mut reader = las::Reader::from_path(path).map_err(read_error)?;
        let header = reader.header().clone();
        let layout = ReadLayout::new(&header);

        let mut cloud = PointCloud::with_header(cloud_header(&header), layout.schema.clone());
        cloud.set_buffer_marked(layout.mark_offset.is_some());

        for point in reader.points() {
            let point = point.map_err(read_error)?;
            cloud.push(layout.convert(&point));
        }

        debug!(
            file = %path.display(),
            points = cloud.len(),
            buffer_marked = cloud.is_buffer_marked(),
            "Read point cloud"
        );
        Ok(cloud)
    }

    fn write(
        &self,
        cloud: &PointCloud,
        path: &Path,
        options: &WriteOptions,
    ) -> Result<(), CodecError> {
        let write_error = |source| CodecError::Write {
            path: path.to_path_buf(),
            source,
        };
        let io_error = |source| CodecError::Io {
            path: path.to_path_buf(),
            source,
        };

        let format_id = options
            .point_format
            .unwrap_or_else(|| auto_point_format(cloud));
        let mut format = Format::new(format_id).map_err(write_error)?;
        format.is_compressed = options.compresses(path);

        let layout = WriteLayout::new(cloud, &format);
        let extra_size = extra_bytes::record_size(&layout.fields);
        format.extra_bytes = u16::try_from(extra_size).map_err(|_| CodecError::Unsupported {
            path: path.to_path_buf(),
            reason: format!("{} bytes of extra dimensions per point", extra_size),
        })?;

        let header = build_header(cloud, format, &layout, options).map_err(write_error)?;

        // Stage next to the target so that the final rename stays on the
        // same file system; the temporary file is removed on drop.
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let staged = tempfile::Builder::new()
            .prefix(".lastile-")
            .suffix(".part")
            .tempfile_in(&dir)
            .map_err(io_error)?;
        let (file, staged_path) = staged.into_parts();

        let mut writer = las::Writer::new(BufWriter::new(file), header).map_err(write_error)?;
        for point in cloud.points() {
            let record = layout.convert(point).map_err(write_error)?;
            writer.write_point(record).map_err(write_error)?;
        }
        writer.close().map_err(write_error)?;
        drop(writer);

        staged_path
            .persist(path)
            .map_err(|e| io_error(e.error))?;

        debug!(
            file = %path.display(),
            points = cloud.len(),
            format = format_id,
            compressed = options.compresses(path),
            "Wrote point cloud"
        );
        Ok(())
    }
}

/// How the records of a file map onto the cloud schema.
struct ReadLayout {
    schema: Schema,
    standard: Vec<Dimension>,
    /// Extra fields with their byte offset and target column
    extras: Vec<(ExtraField, usize, usize)>,
    mark_offset: Option<usize>,
}

impl ReadLayout {
    fn new(header: &las::Header) -> Self {
        let format = header.point_format();
        let mut standard = RECORD_DIMENSIONS.to_vec();
        if format.has_gps_time {
            standard.push(Dimension::GpsTime);
        }
        if format.has_color {
            standard.extend([Dimension::Red, Dimension::Green, Dimension::Blue]);
        }
        if format.has_nir {
            standard.push(Dimension::Infrared);
        }
        let mut schema = Schema::native(&standard);

        let fields = header
            .vlrs()
            .iter()
            .find(|v| v.user_id == EXTRA_BYTES_USER_ID && v.record_id == EXTRA_BYTES_RECORD_ID)
            .map(|v| extra_bytes::parse_descriptors(&v.data))
            .unwrap_or_default();

        let mut extras = Vec::new();
        let mut mark_offset = None;
        let mut offset = 0;
        for field in fields {
            let size = field.size;
            if field.name == BUFFER_MARK_DIMENSION && field.kind.is_some() {
                mark_offset = Some(offset);
            } else if let Some(kind) = field.column_kind() {
                let dimension = extra_dimension(&field.name);
                match schema.push(DimensionDef::new(dimension, kind)) {
                    Ok(column) => extras.push((field, offset, column)),
                    Err(e) => warn!(error = %e, "Ignoring duplicate extra dimension"),
                }
            } else {
                debug!(name = %field.name, size, "Skipping undocumented extra bytes");
            }
            offset += size;
        }

        Self {
            schema,
            standard,
            extras,
            mark_offset,
        }
    }

    fn convert(&self, p: &las::Point) -> Point {
        let mut values: Vec<Value> = self
            .standard
            .iter()
            .map(|d| standard_value(d, p))
            .collect();
        values.extend(self.schema.iter().skip(self.standard.len()).map(|d| d.default));

        for (field, offset, column) in &self.extras {
            if let Some(value) = p.extra_bytes.get(*offset..).and_then(|b| field.decode(b)) {
                values[*column] = value;
            }
        }

        let provenance = self
            .mark_offset
            .and_then(|o| p.extra_bytes.get(o))
            .map(|&flag| Provenance::from_flag(flag))
            .unwrap_or_default();

        Point {
            x: p.x,
            y: p.y,
            z: p.z,
            provenance,
            values,
        }
    }
}

/// How cloud points map onto the records of the output format.
struct WriteLayout {
    format: Format,
    /// Column of each standard dimension, if present in the cloud
    standard: Vec<(Dimension, Option<usize>)>,
    fields: Vec<ExtraField>,
    /// Column of each extra field, `None` for the provenance flag
    field_columns: Vec<Option<usize>>,
}

impl WriteLayout {
    fn new(cloud: &PointCloud, format: &Format) -> Self {
        let schema = cloud.schema();
        let standard = RECORD_DIMENSIONS
            .iter()
            .chain(&[
                Dimension::GpsTime,
                Dimension::Red,
                Dimension::Green,
                Dimension::Blue,
                Dimension::Infrared,
            ])
            .map(|d| (d.clone(), schema.index_of(d)))
            .collect();

        let mut fields = Vec::new();
        let mut field_columns = Vec::new();
        for (column, def) in schema.iter().enumerate() {
            if def.dimension.is_extra() {
                fields.push(ExtraField::scalar(def.dimension.name(), def.kind));
                field_columns.push(Some(column));
            }
        }
        if cloud.is_buffer_marked() {
            fields.push(ExtraField::scalar(BUFFER_MARK_DIMENSION, ValueKind::U8));
            field_columns.push(None);
        }

        Self {
            format: format.clone(),
            standard,
            fields,
            field_columns,
        }
    }

    fn convert(&self, point: &Point) -> Result<las::Point, las::Error> {
        let get = |dimension: &Dimension| -> f64 {
            self.standard
                .iter()
                .find(|(d, _)| d == dimension)
                .and_then(|(_, column)| *column)
                .map(|c| point.values[c].as_f64())
                .unwrap_or_else(|| dimension.default_value(ValueKind::U8).as_f64())
        };

        let mut record = las::Point {
            x: point.x,
            y: point.y,
            z: point.z,
            intensity: get(&Dimension::Intensity) as u16,
            return_number: get(&Dimension::ReturnNumber) as u8,
            number_of_returns: get(&Dimension::NumberOfReturns) as u8,
            scan_direction: if get(&Dimension::ScanDirectionFlag) != 0.0 {
                ScanDirection::LeftToRight
            } else {
                ScanDirection::RightToLeft
            },
            is_edge_of_flight_line: get(&Dimension::EdgeOfFlightLine) != 0.0,
            classification: Classification::new(get(&Dimension::Classification) as u8)?,
            is_synthetic: get(&Dimension::Synthetic) != 0.0,
            is_key_point: get(&Dimension::KeyPoint) != 0.0,
            is_withheld: get(&Dimension::Withheld) != 0.0,
            is_overlap: get(&Dimension::Overlap) != 0.0,
            scanner_channel: get(&Dimension::ScanChannel) as u8,
            scan_angle: get(&Dimension::ScanAngleRank) as f32,
            user_data: get(&Dimension::UserData) as u8,
            point_source_id: get(&Dimension::PointSourceId) as u16,
            ..Default::default()
        };

        if self.format.has_gps_time {
            record.gps_time = Some(get(&Dimension::GpsTime));
        }
        if self.format.has_color {
            record.color = Some(Color {
                red: get(&Dimension::Red) as u16,
                green: get(&Dimension::Green) as u16,
                blue: get(&Dimension::Blue) as u16,
            });
        }
        if self.format.has_nir {
            record.nir = Some(get(&Dimension::Infrared) as u16);
        }

        let mut extra = Vec::with_capacity(extra_bytes::record_size(&self.fields));
        for (field, column) in self.fields.iter().zip(&self.field_columns) {
            match column {
                Some(c) => extra.extend(point.values[*c].to_le_bytes()),
                None => extra.push(point.provenance.flag()),
            }
        }
        record.extra_bytes = extra;
        debug_assert_eq!(record.extra_bytes.len(), extra_bytes::record_size(&self.fields));
        Ok(record)
    }
}

fn build_header(
    cloud: &PointCloud,
    format: Format,
    layout: &WriteLayout,
    options: &WriteOptions,
) -> Result<las::Header, las::Error> {
    let source = cloud.header();
    let mut builder = Builder::from((1, 4));
    builder.point_format = format;
    builder.generating_software = options
        .generating_software
        .clone()
        .unwrap_or_else(|| GENERATING_SOFTWARE.to_string());
    builder.transforms = Vector {
        x: Transform {
            scale: source.scale[0],
            offset: source.offset[0],
        },
        y: Transform {
            scale: source.scale[1],
            offset: source.offset[1],
        },
        z: Transform {
            scale: source.scale[2],
            offset: source.offset[2],
        },
    };

    builder.vlrs = source
        .crs
        .iter()
        .map(|r| Vlr {
            user_id: r.user_id.clone(),
            record_id: r.record_id,
            description: r.description.clone(),
            data: r.data.clone(),
        })
        .collect();
    if !layout.fields.is_empty() {
        builder.vlrs.push(Vlr {
            user_id: EXTRA_BYTES_USER_ID.to_string(),
            record_id: EXTRA_BYTES_RECORD_ID,
            description: "Extra bytes".to_string(),
            data: extra_bytes::encode_descriptors(&layout.fields),
        });
    }

    builder.into_header()
}

fn cloud_header(header: &las::Header) -> CloudHeader {
    let transforms = header.transforms();
    let bounds = header.bounds();
    let crs = header
        .vlrs()
        .iter()
        .chain(header.evlrs())
        .filter(|v| is_crs_record(&v.user_id))
        .map(|v| CrsRecord {
            user_id: v.user_id.clone(),
            record_id: v.record_id,
            description: v.description.clone(),
            data: v.data.clone(),
        })
        .collect();

    CloudHeader {
        scale: [
            transforms.x.scale,
            transforms.y.scale,
            transforms.z.scale,
        ],
        offset: [
            transforms.x.offset,
            transforms.y.offset,
            transforms.z.offset,
        ],
        crs,
        bounds: Some(Extent::new(
            bounds.min.x,
            bounds.min.y,
            bounds.max.x,
            bounds.max.y,
        )),
    }
}

fn extra_dimension(name: &str) -> Dimension {
    match Dimension::from_name(name) {
        dimension @ Dimension::Extra(_) => dimension,
        _ => Dimension::Extra(name.to_string()),
    }
}

fn standard_value(dimension: &Dimension, p: &las::Point) -> Value {
    match dimension {
        Dimension::Intensity => Value::U16(p.intensity),
        Dimension::ReturnNumber => Value::U8(p.return_number),
        Dimension::NumberOfReturns => Value::U8(p.number_of_returns),
        Dimension::ScanDirectionFlag => {
            Value::U8(matches!(p.scan_direction, ScanDirection::LeftToRight) as u8)
        }
        Dimension::EdgeOfFlightLine => Value::U8(p.is_edge_of_flight_line as u8),
        Dimension::Classification => Value::U8(u8::from(p.classification)),
        Dimension::Synthetic => Value::U8(p.is_synthetic as u8),
        Dimension::KeyPoint => Value::U8(p.is_key_point as u8),
        Dimension::Withheld => Value::U8(p.is_withheld as u8),
        Dimension::Overlap => Value::U8(p.is_overlap as u8),
        Dimension::ScanChannel => Value::U8(p.scanner_channel),
        Dimension::ScanAngleRank => Value::F32(p.scan_angle),
        Dimension::UserData => Value::U8(p.user_data),
        Dimension::PointSourceId => Value::U16(p.point_source_id),
        Dimension::GpsTime => Value::F64(p.gps_time.unwrap_or_default()),
        Dimension::Red => Value::U16(p.color.map(|c| c.red).unwrap_or_default()),
        Dimension::Green => Value::U16(p.color.map(|c| c.green).unwrap_or_default()),
        Dimension::Blue => Value::U16(p.color.map(|c| c.blue).unwrap_or_default()),
        Dimension::Infrared => Value::U16(p.nir.unwrap_or_default()),
        Dimension::Extra(_) => Value::F64(0.0),
    }
}
