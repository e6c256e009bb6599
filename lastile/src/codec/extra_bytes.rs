//! LAS 1.4 extra bytes descriptors (`LASF_Spec` record 4).
//!
//! Each descriptor is 192 bytes:
//!
//! | offset | size | field                      |
//! |--------|------|----------------------------|
//! | 0      | 2    | reserved                   |
//! | 2      | 1    | data type                  |
//! | 3      | 1    | options                    |
//! | 4      | 32   | name                       |
//! | 36     | 4    | unused                     |
//! | 40     | 24   | no data                    |
//! | 64     | 24   | min                        |
//! | 88     | 24   | max                        |
//! | 112    | 24   | scale                      |
//! | 136    | 24   | offset                     |
//! | 160    | 32   | description                |

use crate::cloud::{Value, ValueKind};

pub const EXTRA_BYTES_USER_ID: &str = "LASF_Spec";
pub const EXTRA_BYTES_RECORD_ID: u16 = 4;

const DESCRIPTOR_SIZE: usize = 192;
const NAME_OFFSET: usize = 4;
const NAME_SIZE: usize = 32;
const SCALE_OFFSET: usize = 112;
const OFFSET_OFFSET: usize = 136;
const DESCRIPTION_OFFSET: usize = 160;

const OPTION_SCALE: u8 = 0x08;
const OPTION_OFFSET: u8 = 0x10;

/// One field of the extra bytes of a point record.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtraField {
    pub name: String,
    /// `None` for undocumented or array fields, which are skipped
    pub kind: Option<ValueKind>,
    pub size: usize,
    pub scale: Option<f64>,
    pub offset: Option<f64>,
}

impl ExtraField {
    /// A plain scalar field.
    pub fn scalar(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind: Some(kind),
            size: kind.size(),
            scale: None,
            offset: None,
        }
    }

    /// Kind of the decoded column: scaled fields decode to doubles.
    pub fn column_kind(&self) -> Option<ValueKind> {
        let kind = self.kind?;
        if self.scale.is_some() || self.offset.is_some() {
            Some(ValueKind::F64)
        } else {
            Some(kind)
        }
    }

    /// Decodes the field from its bytes.
    pub fn decode(&self, bytes: &[u8]) -> Option<Value> {
        let raw = Value::from_le_bytes(self.kind?, bytes)?;
        if self.scale.is_none() && self.offset.is_none() {
            return Some(raw);
        }
        let scaled = raw.as_f64() * self.scale.unwrap_or(1.0) + self.offset.unwrap_or(0.0);
        Some(Value::F64(scaled))
    }
}

/// Parses the descriptors of an extra bytes record.
///
/// Trailing bytes that do not form a full descriptor are ignored.
pub fn parse_descriptors(data: &[u8]) -> Vec<ExtraField> {
    data.chunks_exact(DESCRIPTOR_SIZE)
        .map(|d| {
            let data_type = d[2];
            let options = d[3];
            let name = read_string(&d[NAME_OFFSET..NAME_OFFSET + NAME_SIZE]);

            let (kind, size) = match data_type {
                0 => (None, options as usize),
                1..=10 => {
                    let kind = kind_from_code(data_type);
                    (kind, kind.map(ValueKind::size).unwrap_or(0))
                }
                // Deprecated 2- and 3-element arrays
                11..=30 => {
                    let count = ((data_type - 1) / 10) as usize + 1;
                    let base = kind_from_code((data_type - 1) % 10 + 1)
                        .map(ValueKind::size)
                        .unwrap_or(0);
                    (None, base * count)
                }
                _ => (None, 0),
            };

            let scale = (options & OPTION_SCALE != 0).then(|| read_f64(d, SCALE_OFFSET));
            let offset = (options & OPTION_OFFSET != 0).then(|| read_f64(d, OFFSET_OFFSET));

            ExtraField {
                name,
                kind,
                size,
                scale,
                offset,
            }
        })
        .collect()
}

/// Serializes descriptors for plain scalar fields.
pub fn encode_descriptors(fields: &[ExtraField]) -> Vec<u8> {
    let mut data = Vec::with_capacity(fields.len() * DESCRIPTOR_SIZE);
    for field in fields {
        let mut d = [0u8; DESCRIPTOR_SIZE];
        d[2] = field.kind.map(kind_code).unwrap_or(0);
        if field.kind.is_none() {
            d[3] = field.size.min(u8::MAX as usize) as u8;
        }
        write_string(&mut d[NAME_OFFSET..NAME_OFFSET + NAME_SIZE], &field.name);
        write_string(&mut d[DESCRIPTION_OFFSET..], &field.name);
        data.extend_from_slice(&d);
    }
    data
}

/// Total size in bytes of the fields in a point record.
pub fn record_size(fields: &[ExtraField]) -> usize {
    fields.iter().map(|f| f.size).sum()
}

fn kind_from_code(code: u8) -> Option<ValueKind> {
    let kind = match code {
        1 => ValueKind::U8,
        2 => ValueKind::I8,
        3 => ValueKind::U16,
        4 => ValueKind::I16,
        5 => ValueKind::U32,
        6 => ValueKind::I32,
        7 => ValueKind::U64,
        8 => ValueKind::I64,
        9 => ValueKind::F32,
        10 => ValueKind::F64,
        _ => return None,
    };
    Some(kind)
}

fn kind_code(kind: ValueKind) -> u8 {
    match kind {
        ValueKind::U8 => 1,
        ValueKind::I8 => 2,
        ValueKind::U16 => 3,
        ValueKind::I16 => 4,
        ValueKind::U32 => 5,
        ValueKind::I32 => 6,
        ValueKind::U64 => 7,
        ValueKind::I64 => 8,
        ValueKind::F32 => 9,
        ValueKind::F64 => 10,
    }
}

fn read_string(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

fn write_string(target: &mut [u8], value: &str) {
    // Keep at least one trailing NUL.
    let bytes = value.as_bytes();
    let len = bytes.len().min(target.len().saturating_sub(1));
    target[..len].copy_from_slice(&bytes[..len]);
}

fn read_f64(descriptor: &[u8], offset: usize) -> f64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&descriptor[offset..offset + 8]);
    f64::from_le_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_round_trip() {
        let fields = vec![
            ExtraField::scalar("is_in_original", ValueKind::U8),
            ExtraField::scalar("height_above_ground", ValueKind::F32),
        ];
        let data = encode_descriptors(&fields);
        assert_eq!(data.len(), 2 * DESCRIPTOR_SIZE);
        assert_eq!(parse_descriptors(&data), fields);
        assert_eq!(record_size(&fields), 5);
    }

    #[test]
    fn test_scaled_field_decodes_to_double() {
        let mut d = [0u8; DESCRIPTOR_SIZE];
        d[2] = 3; // u16
        d[3] = OPTION_SCALE | OPTION_OFFSET;
        d[NAME_OFFSET..NAME_OFFSET + 5].copy_from_slice(b"depth");
        d[SCALE_OFFSET..SCALE_OFFSET + 8].copy_from_slice(&0.5f64.to_le_bytes());
        d[OFFSET_OFFSET..OFFSET_OFFSET + 8].copy_from_slice(&10.0f64.to_le_bytes());

        let fields = parse_descriptors(&d);
        assert_eq!(fields[0].column_kind(), Some(ValueKind::F64));
        assert_eq!(fields[0].decode(&4u16.to_le_bytes()), Some(Value::F64(12.0)));
    }

    #[test]
    fn test_undocumented_and_array_fields_are_sized() {
        let mut data = vec![0u8; 2 * DESCRIPTOR_SIZE];
        data[2] = 0;
        data[3] = 6;
        data[DESCRIPTOR_SIZE + 2] = 13; // 2 x u16
        let fields = parse_descriptors(&data);
        assert_eq!(fields[0].kind, None);
        assert_eq!(fields[0].size, 6);
        assert_eq!(fields[1].kind, None);
        assert_eq!(fields[1].size, 4);
    }

    #[test]
    fn test_long_names_are_truncated() {
        let name = "a".repeat(40);
        let data = encode_descriptors(&[ExtraField::scalar(name, ValueKind::U8)]);
        assert_eq!(parse_descriptors(&data)[0].name.len(), 31);
    }
}
