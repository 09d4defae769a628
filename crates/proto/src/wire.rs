//! Minimal proto3 field codec.
//!
//! Just enough of the protocol-buffers wire format for the fixed
//! message schema: varint, fixed32 and length-delimited fields.
//! Default values are skipped on encode and unknown fields are skipped
//! on decode, per proto3 rules.

use crate::varint;

/// Wire type 0 — varint.
const WIRE_VARINT: u64 = 0;
/// Wire type 1 — 64-bit.
const WIRE_FIXED64: u64 = 1;
/// Wire type 2 — length-delimited.
const WIRE_LEN: u64 = 2;
/// Wire type 5 — 32-bit.
const WIRE_FIXED32: u64 = 5;

/// Payload decoding failure for a recognised message type.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WireError {
    /// The buffer ended inside a tag, varint or field body.
    #[error("truncated field data")]
    Truncated,
    /// A tag carried a wire type this codec does not know.
    #[error("unsupported wire type {0}")]
    UnsupportedWireType(u64),
    /// A field held the wrong wire type for its schema slot.
    #[error("wire type mismatch for field {0}")]
    TypeMismatch(u32),
}

/// Accumulates encoded fields for one message payload.
#[derive(Debug, Default)]
pub struct FieldWriter {
    buf: Vec<u8>,
}

impl FieldWriter {
    /// Start an empty payload.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tag(&mut self, field: u32, wire_type: u64) {
        varint::encode_into((u64::from(field) << 3) | wire_type, &mut self.buf);
    }

    /// Varint field; zero is the default and is skipped.
    pub fn varint(&mut self, field: u32, value: u64) {
        if value != 0 {
            self.tag(field, WIRE_VARINT);
            varint::encode_into(value, &mut self.buf);
        }
    }

    /// Bool field; `false` is skipped.
    pub fn bool(&mut self, field: u32, value: bool) {
        self.varint(field, u64::from(value));
    }

    /// Little-endian fixed 32-bit field; zero is skipped.
    pub fn fixed32(&mut self, field: u32, value: u32) {
        if value != 0 {
            self.tag(field, WIRE_FIXED32);
            self.buf.extend_from_slice(&value.to_le_bytes());
        }
    }

    /// Length-delimited field; empty is skipped.
    pub fn bytes(&mut self, field: u32, value: &[u8]) {
        if !value.is_empty() {
            self.tag(field, WIRE_LEN);
            varint::encode_into(value.len() as u64, &mut self.buf);
            self.buf.extend_from_slice(value);
        }
    }

    /// String field; empty is skipped.
    pub fn string(&mut self, field: u32, value: &str) {
        self.bytes(field, value.as_bytes());
    }

    /// The finished payload.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}

/// One decoded field value, borrowed from the payload.
#[derive(Debug, PartialEq, Eq)]
pub enum FieldValue<'a> {
    /// Wire type 0.
    Varint(u64),
    /// Wire type 1.
    Fixed64(u64),
    /// Wire type 2.
    Bytes(&'a [u8]),
    /// Wire type 5.
    Fixed32(u32),
}

impl FieldValue<'_> {
    /// Interpret as a varint-backed u32 (enums, small ints).
    pub fn u32(&self, field: u32) -> Result<u32, WireError> {
        match self {
            Self::Varint(v) => Ok(*v as u32),
            _ => Err(WireError::TypeMismatch(field)),
        }
    }

    /// Interpret as a bool.
    pub fn bool(&self, field: u32) -> Result<bool, WireError> {
        match self {
            Self::Varint(v) => Ok(*v != 0),
            _ => Err(WireError::TypeMismatch(field)),
        }
    }

    /// Interpret as a little-endian fixed 32-bit value.
    pub fn fixed32(&self, field: u32) -> Result<u32, WireError> {
        match self {
            Self::Fixed32(v) => Ok(*v),
            _ => Err(WireError::TypeMismatch(field)),
        }
    }

    /// Interpret as a UTF-8 string; invalid bytes are replaced rather
    /// than rejected, matching how lenient real firmwares are here.
    pub fn string(&self, field: u32) -> Result<String, WireError> {
        match self {
            Self::Bytes(b) => Ok(String::from_utf8_lossy(b).into_owned()),
            _ => Err(WireError::TypeMismatch(field)),
        }
    }

    /// Interpret as raw bytes.
    pub fn bytes(&self, field: u32) -> Result<Vec<u8>, WireError> {
        match self {
            Self::Bytes(b) => Ok(b.to_vec()),
            _ => Err(WireError::TypeMismatch(field)),
        }
    }
}

/// Iterator over `(field_number, value)` pairs of a payload.
#[derive(Debug)]
pub struct FieldReader<'a> {
    buf: &'a [u8],
}

impl<'a> FieldReader<'a> {
    /// Read fields from `buf`.
    #[must_use]
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    fn take_varint(&mut self) -> Result<u64, WireError> {
        let (value, consumed) = varint::decode(self.buf).ok_or(WireError::Truncated)?;
        self.buf = &self.buf[consumed..];
        Ok(value)
    }

    fn take_bytes(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        if self.buf.len() < len {
            return Err(WireError::Truncated);
        }
        let (head, tail) = self.buf.split_at(len);
        self.buf = tail;
        Ok(head)
    }
}

impl<'a> Iterator for FieldReader<'a> {
    type Item = Result<(u32, FieldValue<'a>), WireError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buf.is_empty() {
            return None;
        }
        let item = (|| {
            let tag = self.take_varint()?;
            let field = (tag >> 3) as u32;
            let value = match tag & 0x7 {
                WIRE_VARINT => FieldValue::Varint(self.take_varint()?),
                WIRE_FIXED64 => {
                    let bytes = self.take_bytes(8)?;
                    FieldValue::Fixed64(u64::from_le_bytes(bytes.try_into().expect("8 bytes")))
                }
                WIRE_LEN => {
                    let len = self.take_varint()? as usize;
                    FieldValue::Bytes(self.take_bytes(len)?)
                }
                WIRE_FIXED32 => {
                    let bytes = self.take_bytes(4)?;
                    FieldValue::Fixed32(u32::from_le_bytes(bytes.try_into().expect("4 bytes")))
                }
                other => return Err(WireError::UnsupportedWireType(other)),
            };
            Ok((field, value))
        })();
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_skip_default_values_on_encode() {
        let mut w = FieldWriter::new();
        w.varint(1, 0);
        w.bool(2, false);
        w.fixed32(3, 0);
        w.string(4, "");
        assert!(w.finish().is_empty());
    }

    #[test]
    fn should_roundtrip_mixed_fields() {
        let mut w = FieldWriter::new();
        w.string(1, "motion");
        w.fixed32(2, 42);
        w.bool(3, true);
        w.varint(4, 300);
        let payload = w.finish();

        let fields: Vec<_> = FieldReader::new(&payload)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(fields.len(), 4);
        assert_eq!(fields[0].1.string(1).unwrap(), "motion");
        assert_eq!(fields[1].1.fixed32(2).unwrap(), 42);
        assert!(fields[2].1.bool(3).unwrap());
        assert_eq!(fields[3].1.u32(4).unwrap(), 300);
    }

    #[test]
    fn should_error_on_truncated_length_delimited_field() {
        // Field 1, wire type 2, claims 10 bytes but carries 2.
        let payload = [0x0A, 0x0A, 0x01, 0x02];
        let result: Result<Vec<_>, _> = FieldReader::new(&payload).collect();
        assert_eq!(result.unwrap_err(), WireError::Truncated);
    }

    #[test]
    fn should_error_on_unsupported_wire_type() {
        // Wire type 3 (deprecated group start).
        let payload = [0x0B];
        let result: Result<Vec<_>, _> = FieldReader::new(&payload).collect();
        assert_eq!(result.unwrap_err(), WireError::UnsupportedWireType(3));
    }

    #[test]
    fn should_report_type_mismatch_through_accessors() {
        let mut w = FieldWriter::new();
        w.varint(1, 5);
        let payload = w.finish();
        let (field, value) = FieldReader::new(&payload).next().unwrap().unwrap();
        assert_eq!(field, 1);
        assert_eq!(value.fixed32(1), Err(WireError::TypeMismatch(1)));
    }

    #[test]
    fn should_decode_fixed64_fields() {
        let mut payload = vec![0x09]; // field 1, wire type 1
        payload.extend_from_slice(&7u64.to_le_bytes());
        let (_, value) = FieldReader::new(&payload).next().unwrap().unwrap();
        assert_eq!(value, FieldValue::Fixed64(7));
    }
}
