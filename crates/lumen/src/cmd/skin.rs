use std::fs;

use lumen_frame::SYNC_SKIN;
use lumen_image::{render_skin, TextureLayout};
use lumen_transport::{Link, SerialTransport};
use serde::Serialize;
use tracing::info;

use crate::cmd::SkinArgs;
use crate::exit::{image_error, io_error, transport_error, CliResult, SUCCESS};
use crate::host::decode_png;
use crate::output::{print_report, OutputFormat, Report};

#[derive(Serialize)]
struct SkinOutput {
    source: String,
    source_width: u32,
    source_height: u32,
    layout: &'static str,
    width: u16,
    height: u16,
    payload_size: usize,
    written_to: Option<String>,
    sent_to: Option<String>,
    #[serde(skip)]
    wire: Vec<u8>,
}

impl Report for SkinOutput {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("source", self.source.clone()),
            (
                "source_size",
                format!("{}x{} ({})", self.source_width, self.source_height, self.layout),
            ),
            ("size", format!("{}x{}", self.width, self.height)),
            ("payload_size", self.payload_size.to_string()),
            (
                "written_to",
                self.written_to.clone().unwrap_or_else(|| "-".to_string()),
            ),
            (
                "sent_to",
                self.sent_to.clone().unwrap_or_else(|| "-".to_string()),
            ),
        ]
    }

    fn raw(&self) -> Vec<u8> {
        self.wire.clone()
    }
}

pub fn run(args: SkinArgs, format: OutputFormat) -> CliResult<i32> {
    let texture = decode_png(&args.png)?;
    let layout = match TextureLayout::of(&texture) {
        TextureLayout::SingleLayer => "single-layer",
        TextureLayout::DualLayer => "dual-layer",
    };
    let payload = render_skin(&texture).map_err(|err| image_error("render failed", err))?;
    let wire = payload.to_wire_bytes();

    if let Some(out) = &args.out {
        fs::write(out, &wire)
            .map_err(|err| io_error(&format!("failed writing {}", out.display()), err))?;
        info!(path = %out.display(), bytes = wire.len(), "skin payload written");
    }

    if let Some(port) = &args.port {
        let mut transport =
            SerialTransport::open(port).map_err(|err| transport_error("open failed", err))?;
        transport
            .send(SYNC_SKIN, &wire)
            .map_err(|err| transport_error("send failed", err))?;
        transport.close();
    }

    print_report(
        &SkinOutput {
            source: args.png.display().to_string(),
            source_width: texture.width(),
            source_height: texture.height(),
            layout,
            width: payload.width(),
            height: payload.height(),
            payload_size: wire.len(),
            written_to: args.out.as_ref().map(|p| p.display().to_string()),
            sent_to: args.port.clone(),
            wire: wire.to_vec(),
        },
        format,
    );
    Ok(SUCCESS)
}
