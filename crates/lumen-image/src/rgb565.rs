use crate::bitmap::Bitmap;

/// Pack an ARGB sample as RGB565 (red in the high bits, blue in the low bits).
///
/// Alpha is dropped.
pub const fn pack_rgb565(argb: u32) -> u16 {
    let r = (argb >> 16) & 0xFF;
    let g = (argb >> 8) & 0xFF;
    let b = argb & 0xFF;
    (((r & 0xF8) << 8) | ((g & 0xFC) << 3) | (b >> 3)) as u16
}

/// Pack every pixel, row-major, two bytes each, little-endian.
///
/// This is the natural in-memory layout. The `sync/skin` wire payload uses
/// the opposite byte order per pixel, see [`crate::SkinPayload::to_wire_bytes`].
pub fn to_rgb565(bitmap: &Bitmap) -> Vec<u8> {
    bitmap
        .pixels()
        .iter()
        .flat_map(|&color| pack_rgb565(color).to_le_bytes())
        .collect()
}
