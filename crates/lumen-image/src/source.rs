use std::collections::HashMap;
use std::fmt;

use crate::bitmap::Bitmap;
use crate::error::{ImageError, Result};

/// Identifier of a texture in the host's texture store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureId(String);

impl TextureId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TextureId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Something that can hand out texture bitmaps by id.
///
/// Implementations may touch state that is only valid on the host's main
/// thread, so the trait takes `&mut self` and is not required to be `Send`.
pub trait TextureSource {
    fn load_texture(&mut self, id: &TextureId) -> Result<Bitmap>;
}

/// A texture store backed by a map, for hosts that decode textures up front.
#[derive(Debug, Default, Clone)]
pub struct MemoryTextures {
    textures: HashMap<TextureId, Bitmap>,
}

impl MemoryTextures {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a texture.
    pub fn insert(&mut self, id: TextureId, bitmap: Bitmap) -> Option<Bitmap> {
        self.textures.insert(id, bitmap)
    }

    pub fn remove(&mut self, id: &TextureId) -> Option<Bitmap> {
        self.textures.remove(id)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }
}

impl TextureSource for MemoryTextures {
    fn load_texture(&mut self, id: &TextureId) -> Result<Bitmap> {
        self.textures
            .get(id)
            .cloned()
            .ok_or_else(|| ImageError::TextureUnavailable {
                id: id.to_string(),
                reason: "not loaded".to_string(),
            })
    }
}
