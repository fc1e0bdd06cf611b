//! A static host for driving the sync worker from the command line.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use lumen_image::{Bitmap, ImageError, TextureId, TextureSource};
use lumen_sync::{HostState, Snapshot};
use png::{ColorType, Transformations};

use crate::exit::{io_error, CliError, CliResult, DATA_INVALID};

/// Decode a PNG file into an ARGB bitmap.
pub fn decode_png(path: &Path) -> CliResult<Bitmap> {
    let file = File::open(path)
        .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
    decode_png_from(BufReader::new(file))
        .map_err(|err| CliError::new(DATA_INVALID, format!("invalid PNG {}: {err}", path.display())))
}

fn decode_png_from(reader: impl io::Read) -> Result<Bitmap, String> {
    let mut decoder = png::Decoder::new(reader);
    decoder.set_transformations(Transformations::EXPAND | Transformations::STRIP_16);
    let mut reader = decoder.read_info().map_err(|err| err.to_string())?;
    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).map_err(|err| err.to_string())?;
    let data = &buf[..info.buffer_size()];

    let rgba: Vec<u8> = match info.color_type {
        ColorType::Rgba => data.to_vec(),
        ColorType::Rgb => data
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 0xFF])
            .collect(),
        ColorType::GrayscaleAlpha => data
            .chunks_exact(2)
            .flat_map(|px| [px[0], px[0], px[0], px[1]])
            .collect(),
        ColorType::Grayscale => data.iter().flat_map(|&v| [v, v, v, 0xFF]).collect(),
        other => return Err(format!("unsupported color type {other:?}")),
    };
    Bitmap::from_rgba8(info.width, info.height, &rgba).map_err(|err| err.to_string())
}

/// Loads textures from PNG files; the texture id is the file path.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngTextures;

impl TextureSource for PngTextures {
    fn load_texture(&mut self, id: &TextureId) -> lumen_image::Result<Bitmap> {
        decode_png(Path::new(id.as_str())).map_err(|err| ImageError::TextureUnavailable {
            id: id.to_string(),
            reason: err.message,
        })
    }
}

/// Host state that never changes, apart from re-reading the skin file.
#[derive(Debug, Clone)]
pub struct StaticHost {
    snapshot: Snapshot,
    skin: Option<TextureId>,
    textures: PngTextures,
}

impl StaticHost {
    pub fn new(snapshot: Snapshot, skin: Option<&Path>) -> Self {
        Self {
            snapshot,
            skin: skin.map(|path| TextureId::new(path.display().to_string())),
            textures: PngTextures,
        }
    }
}

impl TextureSource for StaticHost {
    fn load_texture(&mut self, id: &TextureId) -> lumen_image::Result<Bitmap> {
        self.textures.load_texture(id)
    }
}

impl HostState for StaticHost {
    fn snapshot(&mut self) -> Snapshot {
        self.snapshot
    }

    fn skin_texture_id(&mut self) -> Option<TextureId> {
        self.skin.clone()
    }
}

#[cfg(test)]
mod tests {
    use lumen_sync::{capture_skin_texture, GameMode};

    use super::*;

    fn encode_png(width: u32, height: u32, color: ColorType, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut out, width, height);
            encoder.set_color(color);
            encoder.set_depth(png::BitDepth::Eight);
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        out
    }

    #[test]
    fn decodes_rgba_and_rgb() {
        let rgba = encode_png(1, 1, ColorType::Rgba, &[0x11, 0x22, 0x33, 0x44]);
        let bitmap = decode_png_from(rgba.as_slice()).unwrap();
        assert_eq!(bitmap.get(0, 0), Some(0x4411_2233));

        let rgb = encode_png(2, 1, ColorType::Rgb, &[0xFF, 0, 0, 0, 0, 0xFF]);
        let bitmap = decode_png_from(rgb.as_slice()).unwrap();
        assert_eq!(bitmap.pixels(), &[0xFFFF_0000, 0xFF00_00FF]);
    }

    #[test]
    fn decodes_grayscale() {
        let gray = encode_png(1, 1, ColorType::Grayscale, &[0x80]);
        let bitmap = decode_png_from(gray.as_slice()).unwrap();
        assert_eq!(bitmap.get(0, 0), Some(0xFF80_8080));
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_png_from(&b"not a png"[..]).is_err());
    }

    #[test]
    fn static_host_without_skin() {
        let mut host = StaticHost::new(Snapshot::new(GameMode::Adventure, 5.0, 20.0), None);
        assert_eq!(host.snapshot().mode, GameMode::Adventure);
        assert_eq!(capture_skin_texture(&mut host), None);
    }

    #[test]
    fn missing_skin_file_is_unavailable() {
        let err = PngTextures
            .load_texture(&TextureId::new("/nonexistent/lumen-skin.png"))
            .unwrap_err();
        assert!(matches!(err, ImageError::TextureUnavailable { .. }));
    }
}
