//! Conversion of profile values into TIFF primitive encodings.
//!
//! Everything here is a pure function of its input: no clock reads and no
//! randomness, so encoding the same profile twice yields identical values.

use chrono::NaiveDateTime;

use super::tags::{TYPE_ASCII, TYPE_BYTE, TYPE_LONG, TYPE_RATIONAL};
use crate::error::EncodingError;
use crate::profile::{GeoCoordinate, TIMESTAMP_FORMAT};

/// A typed TIFF field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValue {
    Byte(Vec<u8>),
    /// Raw bytes including the trailing NUL.
    Ascii(Vec<u8>),
    Long(Vec<u32>),
    /// `(numerator, denominator)` pairs.
    Rational(Vec<(u32, u32)>),
}

impl TagValue {
    pub fn field_type(&self) -> u16 {
        match self {
            Self::Byte(_) => TYPE_BYTE,
            Self::Ascii(_) => TYPE_ASCII,
            Self::Long(_) => TYPE_LONG,
            Self::Rational(_) => TYPE_RATIONAL,
        }
    }

    /// Number of values, as stored in the IFD entry's count field.
    pub fn count(&self) -> usize {
        match self {
            Self::Byte(v) | Self::Ascii(v) => v.len(),
            Self::Long(v) => v.len(),
            Self::Rational(v) => v.len(),
        }
    }

    /// Little-endian value bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        match self {
            Self::Byte(v) | Self::Ascii(v) => v.clone(),
            Self::Long(v) => v.iter().flat_map(|x| x.to_le_bytes()).collect(),
            Self::Rational(v) => v
                .iter()
                .flat_map(|(num, den)| num.to_le_bytes().into_iter().chain(den.to_le_bytes()))
                .collect(),
        }
    }
}

/// Encode free text under an ASCII-typed tag.
///
/// The bytes are the UTF-8 encoding, unvalidated for character range, plus
/// a NUL terminator. An interior NUL would silently truncate the value for
/// readers, so it is rejected.
pub fn ascii(field: &'static str, value: &str) -> Result<TagValue, EncodingError> {
    if value.as_bytes().contains(&0) {
        return Err(EncodingError::EmbeddedNul(field));
    }
    let mut bytes = value.as_bytes().to_vec();
    bytes.push(0);
    Ok(TagValue::Ascii(bytes))
}

/// Like [`ascii`], but an empty value is a missing field.
pub fn required_ascii(field: &'static str, value: &str) -> Result<TagValue, EncodingError> {
    if value.is_empty() {
        return Err(EncodingError::MissingField(field));
    }
    ascii(field, value)
}

/// Encode a `YYYY:MM:DD HH:MM:SS` timestamp (19 characters + NUL).
pub fn timestamp(value: &str) -> Result<TagValue, EncodingError> {
    let well_formed = value.len() == 19
        && value.is_ascii()
        && NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).is_ok();
    if !well_formed {
        return Err(EncodingError::InvalidTimestamp(value.to_string()));
    }
    ascii("DateTime", value)
}

/// Encode a degree/minute/second triplet as three `n/1` rationals.
pub fn dms_rationals(coordinate: &GeoCoordinate) -> TagValue {
    TagValue::Rational(coordinate.dms.iter().map(|&v| (v, 1)).collect())
}

/// Encode a hemisphere reference, which must be one of `allowed`.
pub fn hemisphere(
    axis: &'static str,
    coordinate: &GeoCoordinate,
    allowed: [char; 2],
) -> Result<TagValue, EncodingError> {
    let reference = coordinate.reference;
    if !allowed.contains(&reference) {
        return Err(EncodingError::InvalidReference {
            axis,
            found: reference,
            expected: if allowed == ['N', 'S'] { "N/S" } else { "E/W" },
        });
    }
    Ok(TagValue::Ascii(vec![reference as u8, 0]))
}

/// Encode text as UTF-16LE bytes with a two-byte terminator (XP* tags).
pub fn utf16le(value: &str) -> TagValue {
    let mut bytes: Vec<u8> = value.encode_utf16().flat_map(|c| c.to_le_bytes()).collect();
    bytes.push(0);
    bytes.push(0);
    TagValue::Byte(bytes)
}

/// Encode a pixel dimension.
pub fn dimension(value: u32) -> TagValue {
    TagValue::Long(vec![value])
}
