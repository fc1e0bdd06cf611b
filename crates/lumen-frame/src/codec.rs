use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Byte that terminates the frame path.
pub const PATH_TERMINATOR: u8 = b'\n';

/// Size of the little-endian payload length that follows the path.
pub const LENGTH_SIZE: usize = 4;

/// Longest path the decoder will scan for before giving up.
pub const MAX_PATH_LEN: usize = 256;

/// Default maximum payload size accepted by the decoder: 1 MiB.
pub const DEFAULT_MAX_PAYLOAD: usize = 1024 * 1024;

/// A framed message addressed by path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// The path the peripheral dispatches on.
    pub path: String,
    /// The message payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(path: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            path: path.into(),
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (path + terminator + length + payload).
    pub fn wire_size(&self) -> usize {
        self.path.len() + 1 + LENGTH_SIZE + self.payload.len()
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────────────┬──────┬───────────┬──────────────────┐
/// │ Path (UTF-8) │ '\n' │ Length    │ Payload          │
/// │              │ 0x0A │ (4B LE)   │ (Length bytes)   │
/// └──────────────┴──────┴───────────┴──────────────────┘
/// ```
///
/// The codec itself imposes no size limit beyond what the length prefix can
/// represent.
pub fn encode_frame(path: &str, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if path.as_bytes().contains(&PATH_TERMINATOR) {
        return Err(FrameError::InvalidPath(format!(
            "{path:?} contains the path terminator"
        )));
    }
    let length = u32::try_from(payload.len()).map_err(|_| FrameError::PayloadTooLarge {
        size: payload.len(),
        max: u32::MAX as usize,
    })?;

    dst.reserve(path.len() + 1 + LENGTH_SIZE + payload.len());
    dst.put_slice(path.as_bytes());
    dst.put_u8(PATH_TERMINATOR);
    dst.put_u32_le(length);
    dst.put_slice(payload);
    Ok(())
}

/// Decode a frame from a buffer.
///
/// Returns `Ok(None)` if the buffer doesn't contain a complete frame yet.
/// On success, consumes the frame bytes from the buffer.
pub fn decode_frame(src: &mut BytesMut, max_payload: usize) -> Result<Option<Frame>> {
    let window = src.len().min(MAX_PATH_LEN + 1);
    let Some(path_len) = src[..window].iter().position(|&b| b == PATH_TERMINATOR) else {
        if src.len() > MAX_PATH_LEN {
            return Err(FrameError::PathTooLong { max: MAX_PATH_LEN });
        }
        return Ok(None); // Need more data
    };

    let header = path_len + 1 + LENGTH_SIZE;
    if src.len() < header {
        return Ok(None);
    }

    let mut length = [0u8; LENGTH_SIZE];
    length.copy_from_slice(&src[path_len + 1..header]);
    let payload_len = u32::from_le_bytes(length) as usize;

    if payload_len > max_payload {
        return Err(FrameError::PayloadTooLarge {
            size: payload_len,
            max: max_payload,
        });
    }

    if src.len() < header + payload_len {
        return Ok(None);
    }

    let path = std::str::from_utf8(&src[..path_len])
        .map_err(|err| FrameError::InvalidPath(format!("path is not UTF-8: {err}")))?
        .to_string();

    src.advance(header);
    let payload = src.split_to(payload_len).freeze();

    Ok(Some(Frame { path, payload }))
}

/// Configuration for the frame codec.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Maximum payload size in bytes. Default: 1 MiB.
    pub max_payload_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            max_payload_size: DEFAULT_MAX_PAYLOAD,
        }
    }
}
