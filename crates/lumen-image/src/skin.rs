use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::bitmap::Bitmap;
use crate::compositor::compose_front_view;
use crate::error::{ImageError, Result};
use crate::resample::{scale, SKIN_HEIGHT};
use crate::rgb565::pack_rgb565;

/// Size of the little-endian width/height header on the wire.
pub const SKIN_HEADER_SIZE: usize = 4;

/// A skin bitmap packed as RGB565, ready for the `sync/skin` frame.
///
/// The empty payload (0×0, no pixels) means "no skin data"; it has no wire
/// representation and must not be sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkinPayload {
    width: u16,
    height: u16,
    pixels: Vec<u16>,
}

impl SkinPayload {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pack a bitmap. Fails if a dimension does not fit the 16-bit header.
    pub fn from_bitmap(bitmap: &Bitmap) -> Result<Self> {
        let too_large = || ImageError::TooLarge {
            width: bitmap.width(),
            height: bitmap.height(),
        };
        let width = u16::try_from(bitmap.width()).map_err(|_| too_large())?;
        let height = u16::try_from(bitmap.height()).map_err(|_| too_large())?;
        Ok(Self {
            width,
            height,
            pixels: bitmap.pixels().iter().map(|&c| pack_rgb565(c)).collect(),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Packed pixels, row-major.
    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    /// Encode for the wire: width (u16 LE), height (u16 LE), then every
    /// pixel most-significant byte first.
    ///
    /// Returns an empty buffer for the empty payload.
    pub fn to_wire_bytes(&self) -> Bytes {
        if self.is_empty() {
            return Bytes::new();
        }
        let mut buf = BytesMut::with_capacity(SKIN_HEADER_SIZE + self.pixels.len() * 2);
        buf.put_u16_le(self.width);
        buf.put_u16_le(self.height);
        for &pixel in &self.pixels {
            buf.put_u16(pixel);
        }
        buf.freeze()
    }
}

/// Run the full pipeline: front view, scale to [`SKIN_HEIGHT`], pack.
pub fn render_skin(texture: &Bitmap) -> Result<SkinPayload> {
    let front = compose_front_view(texture)?;
    let scaled = scale(&front, SKIN_HEIGHT)?;
    let payload = SkinPayload::from_bitmap(&scaled)?;
    debug!(
        source_width = texture.width(),
        source_height = texture.height(),
        width = payload.width(),
        height = payload.height(),
        "skin rendered"
    );
    Ok(payload)
}
