use std::fs;

use lumen_frame::paths::{describe, is_valid_path};
use lumen_transport::{Link, SerialTransport};
use serde::Serialize;

use crate::cmd::SendArgs;
use crate::exit::{io_error, transport_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_report, OutputFormat, Report};

#[derive(Serialize)]
struct SendOutput<'a> {
    port: &'a str,
    path: &'a str,
    kind: &'static str,
    payload_size: usize,
}

impl Report for SendOutput<'_> {
    fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("port", self.port.to_string()),
            ("path", format!("{} ({})", self.path, self.kind)),
            ("payload_size", self.payload_size.to_string()),
        ]
    }

    fn raw(&self) -> Vec<u8> {
        Vec::new()
    }
}

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    if args.path.is_empty() || !is_valid_path(&args.path) {
        return Err(CliError::new(
            USAGE,
            format!("invalid frame path {:?}: must be non-empty without newlines", args.path),
        ));
    }
    let payload = resolve_payload(&args)?;

    let mut transport =
        SerialTransport::open(&args.port).map_err(|err| transport_error("open failed", err))?;
    transport
        .send(&args.path, &payload)
        .map_err(|err| transport_error("send failed", err))?;
    transport.close();

    print_report(
        &SendOutput {
            port: &args.port,
            path: &args.path,
            kind: describe(&args.path),
            payload_size: payload.len(),
        },
        format,
    );
    Ok(SUCCESS)
}

fn resolve_payload(args: &SendArgs) -> CliResult<Vec<u8>> {
    if let Some(json) = &args.json {
        serde_json::from_str::<serde_json::Value>(json)
            .map_err(|err| CliError::new(USAGE, format!("--json is not valid JSON: {err}")))?;
        return Ok(json.as_bytes().to_vec());
    }
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err));
    }
    Ok(Vec::new())
}
