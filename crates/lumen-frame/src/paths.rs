//! Well-known frame paths.
//!
//! Paths are free-form UTF-8 strings; the peripheral dispatches on them.
//! The only hard rule is that a path never contains the `\n` terminator.

use crate::codec::PATH_TERMINATOR;

/// Scalar player state, carried as a JSON object.
pub const SYNC: &str = "sync";

/// Front-view skin bitmap, carried as a little-endian header plus RGB565 pixels.
pub const SYNC_SKIN: &str = "sync/skin";

/// Returns a human-readable description of a frame path.
pub fn describe(path: &str) -> &'static str {
    match path {
        SYNC => "player state",
        SYNC_SKIN => "skin bitmap",
        _ => "custom",
    }
}

/// Returns true if the path can be framed.
pub fn is_valid_path(path: &str) -> bool {
    !path.as_bytes().contains(&PATH_TERMINATOR)
}
