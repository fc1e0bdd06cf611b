use crate::compositor::Region;

/// Errors that can occur in the image pipeline.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    /// A fixed UV region does not fit inside the source texture.
    #[error("{part} region {region} is outside the {width}x{height} texture")]
    RegionOutOfBounds {
        part: &'static str,
        region: Region,
        width: u32,
        height: u32,
    },

    /// The bitmap (or the requested output) has no pixels.
    #[error("bitmap is empty ({width}x{height})")]
    EmptyBitmap { width: u32, height: u32 },

    /// A pixel buffer does not match the declared dimensions.
    #[error("pixel buffer holds {actual} samples, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// The bitmap cannot be described by the 16-bit payload header.
    #[error("{width}x{height} bitmap exceeds the 16-bit payload header")]
    TooLarge { width: u32, height: u32 },

    /// The host could not provide the requested texture.
    #[error("texture {id} unavailable: {reason}")]
    TextureUnavailable { id: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ImageError>;
