//! Plaintext frame layout.
//!
//! Every frame is `0x00`, then the payload length as a varint, then
//! the message type id as a varint, then the payload bytes. There is
//! no trailer and no checksum; TCP ordering is the only sequencing.

use crate::varint;

/// First byte of every plaintext frame.
pub const PREAMBLE: u8 = 0x00;

/// Upper bound on a declared payload length. Anything larger is a
/// corrupt or hostile stream, not a real message.
pub const MAX_FRAME_LEN: usize = 1024 * 1024;

/// Encode a complete frame for `type_id` and `payload`.
#[must_use]
pub fn encode_frame(type_id: u32, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(payload.len() + 6);
    buf.push(PREAMBLE);
    varint::encode_into(payload.len() as u64, &mut buf);
    varint::encode_into(u64::from(type_id), &mut buf);
    buf.extend_from_slice(payload);
    buf
}

/// Decode one frame from the front of `buf`.
///
/// Returns the type id, the payload slice and the total bytes
/// consumed, or `None` when `buf` does not yet hold a complete,
/// well-formed frame. Used by tests and by callers that already have
/// the whole stream in memory; the adapter reads frames incrementally
/// from the socket instead.
#[must_use]
pub fn decode_frame(buf: &[u8]) -> Option<(u32, &[u8], usize)> {
    let (&first, rest) = buf.split_first()?;
    if first != PREAMBLE {
        return None;
    }
    let (len, len_bytes) = varint::decode(rest)?;
    let len = usize::try_from(len).ok()?;
    if len > MAX_FRAME_LEN {
        return None;
    }
    let rest = &rest[len_bytes..];
    let (type_id, ty_bytes) = varint::decode(rest)?;
    let type_id = u32::try_from(type_id).ok()?;
    let rest = &rest[ty_bytes..];
    if rest.len() < len {
        return None;
    }
    let consumed = 1 + len_bytes + ty_bytes + len;
    Some((type_id, &rest[..len], consumed))
}
