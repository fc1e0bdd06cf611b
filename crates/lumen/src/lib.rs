//! Stream live game state to a Lumen serial peripheral.
//!
//! # Crate Structure
//!
//! - [`frame`]: path-addressed, length-prefixed wire framing
//! - [`transport`]: blocking serial transport and port discovery
//! - [`image`]: skin front-view compositing, resampling and RGB565 packing
//! - [`sync`]: connection lifecycle, main-thread capture and the sync worker
//!
//! The `lumen` binary (feature `cli`) is a reference host built on these.

/// Re-export frame types.
pub mod frame {
    pub use lumen_frame::*;
}

/// Re-export transport types.
pub mod transport {
    pub use lumen_transport::*;
}

/// Re-export image pipeline types.
pub mod image {
    pub use lumen_image::*;
}

/// Re-export sync types.
pub mod sync {
    pub use lumen_sync::*;
}
