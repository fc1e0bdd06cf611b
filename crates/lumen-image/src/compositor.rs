//! Front-view compositing.
//!
//! A skin texture is either single-layer (narrower or shorter than 64 px) or
//! dual-layer (at least 64×64, with a second "overlay" layer). The front view
//! is assembled by copying fixed texture regions into a 16×32 canvas:
//!
//! | Part      | Base (x,y,w,h)                   | Overlay (dual only) | Dest  |
//! |-----------|----------------------------------|---------------------|-------|
//! | Head      | 8,8,8,8                          | 40,8,8,8            | 4,0   |
//! | Body      | 20,20,8,12                       | 20,36,8,12          | 4,8   |
//! | Right arm | 44,20,4,12                       | 44,36,4,12          | 0,8   |
//! | Left arm  | dual 36,52,4,12 / single 44,20   | 52,52,4,12          | 12,8  |
//! | Right leg | 4,20,4,12                        | 4,36,4,12           | 4,20  |
//! | Left leg  | dual 20,52,4,12 / single 4,20    | 4,52,4,12           | 8,20  |
//!
//! Base copies overwrite unconditionally. Overlay copies skip pixels whose
//! alpha is zero and overwrite everything else without blending.

use std::fmt;

use crate::bitmap::{alpha, Bitmap};
use crate::error::{ImageError, Result};

/// Width of the composed front view.
pub const FRONT_VIEW_WIDTH: u32 = 16;
/// Height of the composed front view.
pub const FRONT_VIEW_HEIGHT: u32 = 32;

/// Minimum width and height of a texture carrying the overlay layer.
pub const DUAL_LAYER_MIN_SIZE: u32 = 64;

/// A rectangle in texture space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// True if the whole region lies inside a `width`×`height` bitmap.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.x + self.width <= width && self.y + self.height <= height
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{} {}x{})", self.x, self.y, self.width, self.height)
    }
}

/// Texture layout, decided from the texture dimensions alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureLayout {
    SingleLayer,
    DualLayer,
}

impl TextureLayout {
    pub fn of(texture: &Bitmap) -> Self {
        if texture.width() >= DUAL_LAYER_MIN_SIZE && texture.height() >= DUAL_LAYER_MIN_SIZE {
            Self::DualLayer
        } else {
            Self::SingleLayer
        }
    }
}

struct BodyPart {
    name: &'static str,
    single_base: Region,
    dual_base: Region,
    overlay: Region,
    dest: (u32, u32),
}

// Drawn in order; each part's overlay goes on right after its base.
const BODY_PARTS: [BodyPart; 6] = [
    BodyPart {
        name: "head",
        single_base: Region::new(8, 8, 8, 8),
        dual_base: Region::new(8, 8, 8, 8),
        overlay: Region::new(40, 8, 8, 8),
        dest: (4, 0),
    },
    BodyPart {
        name: "body",
        single_base: Region::new(20, 20, 8, 12),
        dual_base: Region::new(20, 20, 8, 12),
        overlay: Region::new(20, 36, 8, 12),
        dest: (4, 8),
    },
    BodyPart {
        name: "right arm",
        single_base: Region::new(44, 20, 4, 12),
        dual_base: Region::new(44, 20, 4, 12),
        overlay: Region::new(44, 36, 4, 12),
        dest: (0, 8),
    },
    BodyPart {
        name: "left arm",
        single_base: Region::new(44, 20, 4, 12),
        dual_base: Region::new(36, 52, 4, 12),
        overlay: Region::new(52, 52, 4, 12),
        dest: (12, 8),
    },
    BodyPart {
        name: "right leg",
        single_base: Region::new(4, 20, 4, 12),
        dual_base: Region::new(4, 20, 4, 12),
        overlay: Region::new(4, 36, 4, 12),
        dest: (4, 20),
    },
    BodyPart {
        name: "left leg",
        single_base: Region::new(4, 20, 4, 12),
        dual_base: Region::new(20, 52, 4, 12),
        overlay: Region::new(4, 52, 4, 12),
        dest: (8, 20),
    },
];

/// Build the 16×32 front view of a skin texture.
///
/// Pixels not covered by any body part stay fully transparent.
pub fn compose_front_view(texture: &Bitmap) -> Result<Bitmap> {
    let layout = TextureLayout::of(texture);
    let mut front = Bitmap::new(FRONT_VIEW_WIDTH, FRONT_VIEW_HEIGHT);

    for part in &BODY_PARTS {
        match layout {
            TextureLayout::SingleLayer => {
                blit(texture, part.name, part.single_base, &mut front, part.dest)?;
            }
            TextureLayout::DualLayer => {
                blit(texture, part.name, part.dual_base, &mut front, part.dest)?;
                blit_overlay(texture, part.name, part.overlay, &mut front, part.dest)?;
            }
        }
    }

    Ok(front)
}

fn blit(
    src: &Bitmap,
    part: &'static str,
    region: Region,
    dst: &mut Bitmap,
    (dx, dy): (u32, u32),
) -> Result<()> {
    check_region(src, part, region)?;
    for y in 0..region.height {
        for x in 0..region.width {
            if let Some(color) = src.get(region.x + x, region.y + y) {
                dst.set(dx + x, dy + y, color);
            }
        }
    }
    Ok(())
}

fn blit_overlay(
    src: &Bitmap,
    part: &'static str,
    region: Region,
    dst: &mut Bitmap,
    (dx, dy): (u32, u32),
) -> Result<()> {
    check_region(src, part, region)?;
    for y in 0..region.height {
        for x in 0..region.width {
            match src.get(region.x + x, region.y + y) {
                Some(color) if alpha(color) != 0 => dst.set(dx + x, dy + y, color),
                _ => {}
            }
        }
    }
    Ok(())
}

fn check_region(src: &Bitmap, part: &'static str, region: Region) -> Result<()> {
    if region.fits(src.width(), src.height()) {
        Ok(())
    } else {
        Err(ImageError::RegionOutOfBounds {
            part,
            region,
            width: src.width(),
            height: src.height(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitmap::{argb, TRANSPARENT};

    /// Every pixel gets a distinct opaque color derived from its coordinates.
    fn coordinate_texture(width: u32, height: u32) -> Bitmap {
        let mut texture = Bitmap::new(width, height);
        for y in 0..height {
            for x in 0..width {
                texture.set(x, y, argb(0xFF, x as u8, y as u8, 0x5A));
            }
        }
        texture
    }

    fn assert_copied(front: &Bitmap, texture: &Bitmap, src: (u32, u32), dest: (u32, u32), w: u32, h: u32) {
        for y in 0..h {
            for x in 0..w {
                assert_eq!(
                    front.get(dest.0 + x, dest.1 + y),
                    texture.get(src.0 + x, src.1 + y),
                    "dest ({}, {})",
                    dest.0 + x,
                    dest.1 + y
                );
            }
        }
    }

    #[test]
    fn layout_follows_dimensions() {
        assert_eq!(TextureLayout::of(&Bitmap::new(64, 32)), TextureLayout::SingleLayer);
        assert_eq!(TextureLayout::of(&Bitmap::new(32, 64)), TextureLayout::SingleLayer);
        assert_eq!(TextureLayout::of(&Bitmap::new(64, 64)), TextureLayout::DualLayer);
        assert_eq!(TextureLayout::of(&Bitmap::new(128, 128)), TextureLayout::DualLayer);
    }

    #[test]
    fn body_parts_fit_front_view() {
        for part in &BODY_PARTS {
            let dest = Region::new(part.dest.0, part.dest.1, part.dual_base.width, part.dual_base.height);
            assert!(dest.fits(FRONT_VIEW_WIDTH, FRONT_VIEW_HEIGHT), "{}", part.name);
            assert_eq!(part.single_base.width, part.dual_base.width);
            assert_eq!(part.overlay.height, part.dual_base.height);
        }
    }

    #[test]
    fn single_layer_reuses_right_limbs_for_left() {
        let texture = coordinate_texture(64, 32);
        let front = compose_front_view(&texture).unwrap();

        assert_eq!(front.width(), FRONT_VIEW_WIDTH);
        assert_eq!(front.height(), FRONT_VIEW_HEIGHT);
        // right arm and its mirror
        assert_copied(&front, &texture, (44, 20), (0, 8), 4, 12);
        assert_copied(&front, &texture, (44, 20), (12, 8), 4, 12);
        // right leg and its mirror
        assert_copied(&front, &texture, (4, 20), (4, 20), 4, 12);
        assert_copied(&front, &texture, (4, 20), (8, 20), 4, 12);
        assert_copied(&front, &texture, (8, 8), (4, 0), 8, 8);
        assert_copied(&front, &texture, (20, 20), (4, 8), 8, 12);
    }

    #[test]
    fn single_layer_ignores_overlay_regions() {
        let mut texture = coordinate_texture(64, 32);
        // The head overlay region exists in a 64x32 texture but must not be used.
        texture.fill_rect(40, 8, 8, 8, 0xFFFF_0000);

        let front = compose_front_view(&texture).unwrap();
        assert_copied(&front, &texture, (8, 8), (4, 0), 8, 8);
    }

    #[test]
    fn dual_layer_transparent_overlay_keeps_base() {
        let mut texture = coordinate_texture(64, 64);
        texture.fill_rect(40, 8, 8, 8, TRANSPARENT);
        texture.set(41, 9, 0x00FF_FFFF); // zero alpha, non-zero color

        let front = compose_front_view(&texture).unwrap();
        assert_copied(&front, &texture, (8, 8), (4, 0), 8, 8);
        assert_eq!(front.get(5, 1), texture.get(9, 9));
    }

    #[test]
    fn dual_layer_overlay_overwrites_without_blending() {
        let mut texture = coordinate_texture(64, 64);
        texture.fill_rect(20, 36, 8, 12, TRANSPARENT);
        texture.set(20, 36, 0x0112_3456); // alpha 1
        texture.set(27, 47, 0xFFAB_CDEF);

        let front = compose_front_view(&texture).unwrap();
        assert_eq!(front.get(4, 8), Some(0x0112_3456));
        assert_eq!(front.get(11, 19), Some(0xFFAB_CDEF));
        assert_eq!(front.get(5, 8), texture.get(21, 20));
    }

    #[test]
    fn dual_layer_uses_dedicated_left_limbs() {
        let mut texture = coordinate_texture(64, 64);
        for overlay in [(40, 8, 8, 8), (20, 36, 8, 12), (44, 36, 4, 12), (52, 52, 4, 12), (4, 36, 4, 12), (4, 52, 4, 12)] {
            texture.fill_rect(overlay.0, overlay.1, overlay.2, overlay.3, TRANSPARENT);
        }

        let front = compose_front_view(&texture).unwrap();
        assert_copied(&front, &texture, (36, 52), (12, 8), 4, 12);
        assert_copied(&front, &texture, (20, 52), (8, 20), 4, 12);
        assert_copied(&front, &texture, (44, 20), (0, 8), 4, 12);
    }

    #[test]
    fn dual_layer_left_limb_overlays_apply() {
        let mut texture = coordinate_texture(64, 64);
        texture.fill_rect(52, 52, 4, 12, 0xFF11_1111);
        texture.fill_rect(4, 52, 4, 12, 0xFF22_2222);

        let front = compose_front_view(&texture).unwrap();
        assert_eq!(front.get(12, 8), Some(0xFF11_1111));
        assert_eq!(front.get(15, 19), Some(0xFF11_1111));
        assert_eq!(front.get(8, 20), Some(0xFF22_2222));
        assert_eq!(front.get(11, 31), Some(0xFF22_2222));
    }

    #[test]
    fn uncovered_pixels_stay_transparent() {
        let front = compose_front_view(&coordinate_texture(64, 32)).unwrap();
        assert_eq!(front.get(0, 0), Some(TRANSPARENT));
        assert_eq!(front.get(15, 7), Some(TRANSPARENT));
        assert_eq!(front.get(0, 31), Some(TRANSPARENT));
    }

    #[test]
    fn too_small_texture_is_rejected() {
        let err = compose_front_view(&Bitmap::new(8, 8)).unwrap_err();
        assert!(matches!(
            err,
            ImageError::RegionOutOfBounds { part: "head", .. }
        ));
    }
}
