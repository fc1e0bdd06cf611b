use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use lumen_frame::{paths, Frame, SYNC_SKIN};
use serde::Serialize;

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// A command result that renders in every output format.
pub trait Report: Serialize {
    /// Field/value pairs for table and pretty output.
    fn rows(&self) -> Vec<(&'static str, String)>;

    /// Bytes for `--format raw`. Defaults to the JSON form.
    fn raw(&self) -> Vec<u8> {
        serde_json::to_vec(self).unwrap_or_default()
    }
}

pub fn print_report<R: Report>(report: &R, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(report).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["FIELD", "VALUE"]);
            for (field, value) in report.rows() {
                table.add_row(vec![field.to_string(), value]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let line: Vec<String> = report
                .rows()
                .into_iter()
                .map(|(field, value)| format!("{field}={value}"))
                .collect();
            println!("{}", line.join(" "));
        }
        OutputFormat::Raw => print_raw(&report.raw()),
    }
}

#[derive(Serialize)]
struct FrameOutput<'a> {
    path: &'a str,
    kind: &'static str,
    payload_size: usize,
    payload: String,
    port: &'a str,
    timestamp: String,
}

pub fn print_frame(frame: &Frame, port: &str, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = FrameOutput {
                path: &frame.path,
                kind: paths::describe(&frame.path),
                payload_size: frame.payload.len(),
                payload: payload_preview(&frame.path, frame.payload.as_ref()),
                port,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = new_table(vec!["PATH", "SIZE", "PORT", "PAYLOAD"]);
            table.add_row(vec![
                frame.path.clone(),
                frame.payload.len().to_string(),
                port.to_string(),
                payload_preview(&frame.path, frame.payload.as_ref()),
            ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "path={} ({}) size={} port={} payload={}",
                frame.path,
                paths::describe(&frame.path),
                frame.payload.len(),
                port,
                payload_preview(&frame.path, frame.payload.as_ref())
            );
        }
        OutputFormat::Raw => {
            print_raw(frame.payload.as_ref());
        }
    }
}

pub fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn payload_preview(path: &str, payload: &[u8]) -> String {
    if path == SYNC_SKIN && payload.len() >= 4 {
        let width = u16::from_le_bytes([payload[0], payload[1]]);
        let height = u16::from_le_bytes([payload[2], payload[3]]);
        return format!("<skin {width}x{height}, {} bytes>", payload.len());
    }
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
