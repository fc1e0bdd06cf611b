//! Skin image pipeline for the Lumen peripheral.
//!
//! A layered skin texture goes through three deterministic steps:
//! - [`compose_front_view`] copies fixed UV regions into a 16×32 front view
//! - [`scale`] nearest-neighbor resamples it to [`SKIN_HEIGHT`] rows
//! - [`SkinPayload`] packs the pixels as RGB565 for the `sync/skin` frame
//!
//! [`render_skin`] runs the whole pipeline. Nothing here performs I/O;
//! textures come in through the [`TextureSource`] capability.

pub mod bitmap;
pub mod compositor;
pub mod error;
pub mod resample;
pub mod rgb565;
pub mod skin;
pub mod source;

pub use bitmap::{argb, Bitmap, TRANSPARENT};
pub use compositor::{
    compose_front_view, Region, TextureLayout, FRONT_VIEW_HEIGHT, FRONT_VIEW_WIDTH,
};
pub use error::{ImageError, Result};
pub use resample::{scale, target_width, SKIN_HEIGHT};
pub use rgb565::{pack_rgb565, to_rgb565};
pub use skin::{render_skin, SkinPayload};
pub use source::{MemoryTextures, TextureId, TextureSource};
