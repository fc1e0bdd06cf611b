use crate::bitmap::Bitmap;
use crate::error::{ImageError, Result};

/// Output height of the skin bitmap sent to the peripheral.
pub const SKIN_HEIGHT: u32 = 120;

/// Width that keeps the aspect ratio at `target_height`, rounded half up, at least 1.
pub fn target_width(src_width: u32, src_height: u32, target_height: u32) -> u32 {
    let num = 2 * u64::from(src_width) * u64::from(target_height) + u64::from(src_height);
    let width = num / (2 * u64::from(src_height));
    u32::try_from(width).unwrap_or(u32::MAX).max(1)
}

/// Nearest-neighbor scale to `target_height`, preserving aspect ratio.
///
/// Destination `(x, y)` samples source `(x * src_w / dst_w, y * src_h / dst_h)`
/// with truncating division: top-left biased, no interpolation.
pub fn scale(bitmap: &Bitmap, target_height: u32) -> Result<Bitmap> {
    let (src_width, src_height) = (bitmap.width(), bitmap.height());
    if bitmap.is_empty() || target_height == 0 {
        return Err(ImageError::EmptyBitmap {
            width: src_width,
            height: src_height,
        });
    }

    let dst_width = target_width(src_width, src_height, target_height);
    let mut pixels = Vec::with_capacity(dst_width as usize * target_height as usize);
    for y in 0..target_height {
        let src_y = (u64::from(y) * u64::from(src_height) / u64::from(target_height)) as u32;
        for x in 0..dst_width {
            let src_x = (u64::from(x) * u64::from(src_width) / u64::from(dst_width)) as u32;
            pixels.push(bitmap.get(src_x, src_y).unwrap_or_default());
        }
    }

    Bitmap::from_argb(dst_width, target_height, pixels)
}
