//! Native API adapter error types.

use std::net::SocketAddr;

/// Errors specific to the native API adapter.
#[derive(Debug, thiserror::Error)]
pub enum NativeApiError {
    /// The listener socket could not be bound.
    #[error("failed to bind native API listener on {addr}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// A socket read or write failed.
    #[error("socket error")]
    Io(#[from] std::io::Error),

    /// A frame started with something other than the plaintext
    /// preamble byte.
    #[error("invalid frame preamble {0:#04x}")]
    BadPreamble(u8),

    /// A frame declared a payload larger than the hard limit.
    #[error("declared frame length {0} exceeds limit")]
    FrameTooLarge(usize),

    /// A frame header varint did not terminate within 64 bits.
    #[error("malformed frame header varint")]
    MalformedVarint,

    /// A recognised message type carried a malformed payload.
    #[error(transparent)]
    Decode(#[from] espnode_proto::DecodeError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_display_bad_preamble_in_hex() {
        let err = NativeApiError::BadPreamble(0x7F);
        assert_eq!(err.to_string(), "invalid frame preamble 0x7f");
    }

    #[test]
    fn should_display_oversize_frame_length() {
        let err = NativeApiError::FrameTooLarge(usize::MAX);
        assert!(err.to_string().contains("exceeds limit"));
    }
}
