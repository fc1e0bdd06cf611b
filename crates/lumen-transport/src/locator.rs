//! Serial port discovery.
//!
//! Resolution order for the desired port:
//! 1. the configured path
//! 2. the `LUMEN_SERIAL_PORT` environment variable
//! 3. auto-detection over the enumerated ports
//!
//! Blank values are skipped at every step.

use tracing::debug;

use crate::error::{Result, TransportError};

/// Environment variable that overrides auto-detection.
pub const PORT_ENV_VAR: &str = "LUMEN_SERIAL_PORT";

const PREFERRED_MARKERS: [&str; 3] = ["usb", "modem", "tty"];

/// Resolve the port path to connect to, or `None` if nothing is available.
pub fn resolve_port_path(configured: &str) -> Option<String> {
    let env = std::env::var(PORT_ENV_VAR).ok();
    resolve_with(configured, env.as_deref(), auto_detect_port)
}

fn resolve_with(
    configured: &str,
    env: Option<&str>,
    detect: impl FnOnce() -> Option<String>,
) -> Option<String> {
    let configured = configured.trim();
    if !configured.is_empty() {
        return Some(configured.to_string());
    }
    if let Some(env) = env.map(str::trim).filter(|value| !value.is_empty()) {
        return Some(env.to_string());
    }
    detect()
}

/// Pick the most likely peripheral port from the system's serial ports.
pub fn auto_detect_port() -> Option<String> {
    match list_ports() {
        Ok(ports) => preferred_port(&ports),
        Err(err) => {
            debug!(error = %err, "serial port enumeration failed");
            None
        }
    }
}

/// List serial port names, trimmed, without blanks, sorted ascending.
pub fn list_ports() -> Result<Vec<String>> {
    let ports = serialport::available_ports().map_err(|err| TransportError::Enumerate(err.into()))?;
    let mut names: Vec<String> = ports
        .into_iter()
        .map(|port| port.port_name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect();
    names.sort();
    Ok(names)
}

/// First port whose name looks like a USB/modem/tty device, else the first port.
pub fn preferred_port(names: &[String]) -> Option<String> {
    names
        .iter()
        .find(|name| {
            let lower = name.to_lowercase();
            PREFERRED_MARKERS.iter().any(|marker| lower.contains(marker))
        })
        .or_else(|| names.first())
        .cloned()
}
