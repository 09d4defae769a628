//! Variable-length unsigned integers.
//!
//! Seven bits per byte, continuation bit (`0x80`) set on every byte
//! but the last, least-significant group first.

/// Append the varint encoding of `value` to `buf`.
pub fn encode_into(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7F) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Encode `value` into a fresh buffer.
#[must_use]
pub fn encode(value: u64) -> Vec<u8> {
    let mut buf = Vec::with_capacity(10);
    encode_into(value, &mut buf);
    buf
}

/// Decode a varint from the front of `buf`.
///
/// Returns the value and the number of bytes consumed, or `None` when
/// the buffer ends mid-sequence or the encoding exceeds 64 bits. Never
/// panics; a truncated stream is the caller's signal to drop the
/// connection.
#[must_use]
pub fn decode(buf: &[u8]) -> Option<(u64, usize)> {
    let mut result: u64 = 0;
    for (i, &byte) in buf.iter().enumerate() {
        if i >= 10 {
            return None;
        }
        result |= u64::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Some((result, i + 1));
        }
    }
    None
}
