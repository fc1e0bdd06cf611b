use crate::error::{ImageError, Result};

/// Fully transparent black.
pub const TRANSPARENT: u32 = 0x0000_0000;

/// Pack 8-bit channels into a 32-bit ARGB sample.
pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Alpha channel of an ARGB sample.
pub const fn alpha(color: u32) -> u8 {
    (color >> 24) as u8
}

/// A 2-D grid of 32-bit ARGB samples, row-major, top-to-bottom.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl Bitmap {
    /// Create a fully transparent bitmap.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![TRANSPARENT; width as usize * height as usize],
        }
    }

    /// Wrap an existing ARGB pixel buffer.
    pub fn from_argb(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(ImageError::DimensionMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build a bitmap from tightly packed 8-bit RGBA bytes (the usual decoder output).
    pub fn from_rgba8(width: u32, height: u32, rgba: &[u8]) -> Result<Self> {
        let expected = width as usize * height as usize;
        if rgba.len() != expected * 4 {
            return Err(ImageError::DimensionMismatch {
                expected,
                actual: rgba.len() / 4,
            });
        }
        let pixels = rgba
            .chunks_exact(4)
            .map(|px| argb(px[3], px[0], px[1], px[2]))
            .collect();
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// True when the bitmap has no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// All samples, row-major.
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    /// Sample at `(x, y)`, or `None` outside the bitmap.
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Overwrite the sample at `(x, y)`. Writes outside the bitmap are ignored.
    pub fn set(&mut self, x: u32, y: u32, color: u32) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// Fill a rectangle with one color, clipped to the bitmap.
    pub fn fill_rect(&mut self, x: u32, y: u32, width: u32, height: u32, color: u32) {
        for dy in 0..height {
            for dx in 0..width {
                self.set(x + dx, y + dy, color);
            }
        }
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height)
            .then(|| y as usize * self.width as usize + x as usize)
    }
}

impl std::fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
