//! Async frame IO.
//!
//! Incremental reader and writer for the plaintext frame layout:
//! preamble byte, payload length varint, type id varint, payload. A
//! clean EOF (including one that lands mid-frame on a dying peer)
//! surfaces as `Ok(None)`; protocol violations surface as errors so
//! the caller can drop the connection.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use espnode_proto::frame::{MAX_FRAME_LEN, PREAMBLE, encode_frame};

use crate::error::NativeApiError;

/// Read one varint, byte by byte. `Ok(None)` on EOF.
async fn read_varint<R>(reader: &mut R) -> Result<Option<u64>, NativeApiError>
where
    R: AsyncRead + Unpin,
{
    let mut result: u64 = 0;
    for shift in 0..10u32 {
        let byte = match reader.read_u8().await {
            Ok(byte) => byte,
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        result |= u64::from(byte & 0x7F) << (7 * shift);
        if byte & 0x80 == 0 {
            return Ok(Some(result));
        }
    }
    // More than 10 continuation bytes cannot be a 64-bit value.
    Err(NativeApiError::MalformedVarint)
}

/// Read one complete frame.
///
/// Returns the type id and payload, or `None` when the peer closed the
/// stream.
///
/// # Errors
///
/// [`NativeApiError::BadPreamble`] for a wrong first byte and
/// [`NativeApiError::FrameTooLarge`] for an oversize declared length;
/// both mean the stream can no longer be trusted.
pub async fn read_frame<R>(reader: &mut R) -> Result<Option<(u32, Vec<u8>)>, NativeApiError>
where
    R: AsyncRead + Unpin,
{
    let first = match reader.read_u8().await {
        Ok(byte) => byte,
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(err) => return Err(err.into()),
    };
    if first != PREAMBLE {
        return Err(NativeApiError::BadPreamble(first));
    }

    let Some(len) = read_varint(reader).await? else {
        return Ok(None);
    };
    let len = usize::try_from(len).unwrap_or(usize::MAX);
    if len > MAX_FRAME_LEN {
        return Err(NativeApiError::FrameTooLarge(len));
    }

    let Some(type_id) = read_varint(reader).await? else {
        return Ok(None);
    };
    let type_id = u32::try_from(type_id).map_err(|_| NativeApiError::MalformedVarint)?;

    let mut payload = vec![0u8; len];
    match reader.read_exact(&mut payload).await {
        Ok(_) => Ok(Some((type_id, payload))),
        Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Write one complete frame and flush it.
///
/// # Errors
///
/// Propagates the underlying socket error.
pub async fn write_frame<W>(
    writer: &mut W,
    type_id: u32,
    payload: &[u8],
) -> Result<(), NativeApiError>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&encode_frame(type_id, payload)).await?;
    writer.flush().await?;
    Ok(())
}
