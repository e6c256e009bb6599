//! Point attributes: dimension names, storage kinds and values.

use std::fmt;

/// A point attribute.
///
/// The known LAS dimensions are listed explicitly; anything else (extra
/// bytes dimensions) is carried as [`Dimension::Extra`]. Names follow the
/// PDAL conventions used by the LAS tooling ecosystem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    Intensity,
    ReturnNumber,
    NumberOfReturns,
    ScanDirectionFlag,
    EdgeOfFlightLine,
    Classification,
    Synthetic,
    KeyPoint,
    Withheld,
    Overlap,
    ScanChannel,
    ScanAngleRank,
    UserData,
    PointSourceId,
    GpsTime,
    Red,
    Green,
    Blue,
    Infrared,
    Extra(String),
}

/// Names reserved for the coordinates, which are not attributes.
pub const COORDINATE_NAMES: [&str; 3] = ["X", "Y", "Z"];

impl Dimension {
    /// Known dimensions, in LAS record order.
    pub const STANDARD: [Dimension; 19] = [
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
        Dimension::GpsTime,
        Dimension::Red,
        Dimension::Green,
        Dimension::Blue,
        Dimension::Infrared,
    ];

    /// Name of the dimension.
    pub fn name(&self) -> &str {
        match self {
            Dimension::Intensity => "Intensity",
            Dimension::ReturnNumber => "ReturnNumber",
            Dimension::NumberOfReturns => "NumberOfReturns",
            Dimension::ScanDirectionFlag => "ScanDirectionFlag",
            Dimension::EdgeOfFlightLine => "EdgeOfFlightLine",
            Dimension::Classification => "Classification",
            Dimension::Synthetic => "Synthetic",
            Dimension::KeyPoint => "KeyPoint",
            Dimension::Withheld => "Withheld",
            Dimension::Overlap => "Overlap",
            Dimension::ScanChannel => "ScanChannel",
            Dimension::ScanAngleRank => "ScanAngleRank",
            Dimension::UserData => "UserData",
            Dimension::PointSourceId => "PointSourceId",
            Dimension::GpsTime => "GpsTime",
            Dimension::Red => "Red",
            Dimension::Green => "Green",
            Dimension::Blue => "Blue",
            Dimension::Infrared => "Infrared",
            Dimension::Extra(name) => name,
        }
    }

    /// Looks a dimension up by name.
    ///
    /// Unknown names are extra dimensions.
    pub fn from_name(name: &str) -> Dimension {
        Self::STANDARD
            .iter()
            .find(|d| d.name() == name)
            .cloned()
            .unwrap_or_else(|| Dimension::Extra(name.to_string()))
    }

    pub fn is_extra(&self) -> bool {
        matches!(self, Dimension::Extra(_))
    }

    /// Storage kind imposed by the LAS point record, `None` for extras.
    pub fn native_kind(&self) -> Option<ValueKind> {
        let kind = match self {
            Dimension::Intensity
            | Dimension::PointSourceId
            | Dimension::Red
            | Dimension::Green
            | Dimension::Blue
            | Dimension::Infrared => ValueKind::U16,
            Dimension::ScanAngleRank => ValueKind::F32,
            Dimension::GpsTime => ValueKind::F64,
            Dimension::Extra(_) => return None,
            _ => ValueKind::U8,
        };
        Some(kind)
    }

    /// Value stored when a point has no data for this dimension.
    pub fn default_value(&self, kind: ValueKind) -> Value {
        match self {
            Dimension::ReturnNumber | Dimension::NumberOfReturns => Value::U8(1),
            _ => kind.zero(),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Storage type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
    F32,
    F64,
}

impl ValueKind {
    /// Size in bytes of one value.
    pub fn size(self) -> usize {
        match self {
            ValueKind::U8 | ValueKind::I8 => 1,
            ValueKind::U16 | ValueKind::I16 => 2,
            ValueKind::U32 | ValueKind::I32 | ValueKind::F32 => 4,
            ValueKind::U64 | ValueKind::I64 | ValueKind::F64 => 8,
        }
    }

    pub fn is_integer(self) -> bool {
        !matches!(self, ValueKind::F32 | ValueKind::F64)
    }

    pub fn zero(self) -> Value {
        match self {
            ValueKind::U8 => Value::U8(0),
            ValueKind::I8 => Value::I8(0),
            ValueKind::U16 => Value::U16(0),
            ValueKind::I16 => Value::I16(0),
            ValueKind::U32 => Value::U32(0),
            ValueKind::I32 => Value::I32(0),
            ValueKind::U64 => Value::U64(0),
            ValueKind::I64 => Value::I64(0),
            ValueKind::F32 => Value::F32(0.0),
            ValueKind::F64 => Value::F64(0.0),
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::U8 => "uint8",
            ValueKind::I8 => "int8",
            ValueKind::U16 => "uint16",
            ValueKind::I16 => "int16",
            ValueKind::U32 => "uint32",
            ValueKind::I32 => "int32",
            ValueKind::U64 => "uint64",
            ValueKind::I64 => "int64",
            ValueKind::F32 => "float",
            ValueKind::F64 => "double",
        };
        f.write_str(name)
    }
}

/// A single attribute value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    U8(u8),
    I8(i8),
    U16(u16),
    I16(i16),
    U32(u32),
    I32(i32),
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::U8(_) => ValueKind::U8,
            Value::I8(_) => ValueKind::I8,
            Value::U16(_) => ValueKind::U16,
            Value::I16(_) => ValueKind::I16,
            Value::U32(_) => ValueKind::U32,
            Value::I32(_) => ValueKind::I32,
            Value::U64(_) => ValueKind::U64,
            Value::I64(_) => ValueKind::I64,
            Value::F32(_) => ValueKind::F32,
            Value::F64(_) => ValueKind::F64,
        }
    }

    /// Value as a double, lossy for large 64-bit integers.
    pub fn as_f64(&self) -> f64 {
        match *self {
            Value::U8(v) => v as f64,
            Value::I8(v) => v as f64,
            Value::U16(v) => v as f64,
            Value::I16(v) => v as f64,
            Value::U32(v) => v as f64,
            Value::I32(v) => v as f64,
            Value::U64(v) => v as f64,
            Value::I64(v) => v as f64,
            Value::F32(v) => v as f64,
            Value::F64(v) => v,
        }
    }

    /// Integer value, `None` for floating point kinds or out of range.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::U8(v) => Some(v as i64),
            Value::I8(v) => Some(v as i64),
            Value::U16(v) => Some(v as i64),
            Value::I16(v) => Some(v as i64),
            Value::U32(v) => Some(v as i64),
            Value::I32(v) => Some(v as i64),
            Value::U64(v) => i64::try_from(v).ok(),
            Value::I64(v) => Some(v),
            Value::F32(_) | Value::F64(_) => None,
        }
    }

    /// Converts an integer to `kind`, `None` when it does not fit.
    pub fn from_i64(kind: ValueKind, v: i64) -> Option<Value> {
        let value = match kind {
            ValueKind::U8 => Value::U8(u8::try_from(v).ok()?),
            ValueKind::I8 => Value::I8(i8::try_from(v).ok()?),
            ValueKind::U16 => Value::U16(u16::try_from(v).ok()?),
            ValueKind::I16 => Value::I16(i16::try_from(v).ok()?),
            ValueKind::U32 => Value::U32(u32::try_from(v).ok()?),
            ValueKind::I32 => Value::I32(i32::try_from(v).ok()?),
            ValueKind::U64 => Value::U64(u64::try_from(v).ok()?),
            ValueKind::I64 => Value::I64(v),
            ValueKind::F32 => Value::F32(v as f32),
            ValueKind::F64 => Value::F64(v as f64),
        };
        Some(value)
    }

    /// Converts a double to `kind`, saturating integer kinds.
    pub fn from_f64(kind: ValueKind, v: f64) -> Value {
        match kind {
            ValueKind::U8 => Value::U8(v as u8),
            ValueKind::I8 => Value::I8(v as i8),
            ValueKind::U16 => Value::U16(v as u16),
            ValueKind::I16 => Value::I16(v as i16),
            ValueKind::U32 => Value::U32(v as u32),
            ValueKind::I32 => Value::I32(v as i32),
            ValueKind::U64 => Value::U64(v as u64),
            ValueKind::I64 => Value::I64(v as i64),
            ValueKind::F32 => Value::F32(v as f32),
            ValueKind::F64 => Value::F64(v),
        }
    }

    /// Little-endian encoding.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match *self {
            Value::U8(v) => v.to_le_bytes().to_vec(),
            Value::I8(v) => v.to_le_bytes().to_vec(),
            Value::U16(v) => v.to_le_bytes().to_vec(),
            Value::I16(v) => v.to_le_bytes().to_vec(),
            Value::U32(v) => v.to_le_bytes().to_vec(),
            Value::I32(v) => v.to_le_bytes().to_vec(),
            Value::U64(v) => v.to_le_bytes().to_vec(),
            Value::I64(v) => v.to_le_bytes().to_vec(),
            Value::F32(v) => v.to_le_bytes().to_vec(),
            Value::F64(v) => v.to_le_bytes().to_vec(),
        }
    }

    /// Decodes a little-endian value, `None` when `bytes` is too short.
    pub fn from_le_bytes(kind: ValueKind, bytes: &[u8]) -> Option<Value> {
        let b = bytes.get(..kind.size())?;
        let value = match kind {
            ValueKind::U8 => Value::U8(b[0]),
            ValueKind::I8 => Value::I8(b[0] as i8),
            ValueKind::U16 => Value::U16(u16::from_le_bytes(b.try_into().ok()?)),
            ValueKind::I16 => Value::I16(i16::from_le_bytes(b.try_into().ok()?)),
            ValueKind::U32 => Value::U32(u32::from_le_bytes(b.try_into().ok()?)),
            ValueKind::I32 => Value::I32(i32::from_le_bytes(b.try_into().ok()?)),
            ValueKind::U64 => Value::U64(u64::from_le_bytes(b.try_into().ok()?)),
            ValueKind::I64 => Value::I64(i64::from_le_bytes(b.try_into().ok()?)),
            ValueKind::F32 => Value::F32(f32::from_le_bytes(b.try_into().ok()?)),
            ValueKind::F64 => Value::F64(f64::from_le_bytes(b.try_into().ok()?)),
        };
        Some(value)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U8(v) => write!(f, "{}", v),
            Value::I8(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::U32(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::U64(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
        }
    }
}
