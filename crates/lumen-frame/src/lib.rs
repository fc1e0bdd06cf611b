//! Path-addressed, length-prefixed framing for the Lumen serial link.
//!
//! Every message on the wire is:
//! - the UTF-8 frame path (for example `sync` or `sync/skin`)
//! - a single `\n` terminator
//! - a 4-byte little-endian payload length
//! - the payload bytes
//!
//! The peripheral routes payloads by path. The host only ever writes frames;
//! [`FrameReader`] exists for monitoring tools and tests.

pub mod codec;
pub mod error;
pub mod paths;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, Frame, FrameConfig, DEFAULT_MAX_PAYLOAD, LENGTH_SIZE,
    MAX_PATH_LEN, PATH_TERMINATOR,
};
pub use error::{FrameError, Result};
pub use paths::{SYNC, SYNC_SKIN};
pub use reader::FrameReader;
pub use writer::FrameWriter;
