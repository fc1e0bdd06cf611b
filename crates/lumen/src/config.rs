//! Host settings file.
//!
//! ```json
//! { "port_path": "", "auto_reconnect": true, "reconnect_period_seconds": 5 }
//! ```
//!
//! A missing file means defaults. An unreadable or malformed file logs a
//! warning and also yields defaults. Files using the camelCase keys
//! (`portPath`, `autoReconnect`, `reconnectPeriodSeconds`) load too.

use std::fs;
use std::io;
use std::path::Path;

use lumen_sync::{ConnectionSettings, ReconnectPolicy};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Default settings file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "lumen.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LumenConfig {
    /// Serial device; blank means environment or auto-detection.
    #[serde(alias = "portPath")]
    pub port_path: String,
    #[serde(alias = "autoReconnect")]
    pub auto_reconnect: bool,
    /// Values below 1 are treated as 1.
    #[serde(alias = "reconnectPeriodSeconds")]
    pub reconnect_period_seconds: i64,
}

impl Default for LumenConfig {
    fn default() -> Self {
        Self {
            port_path: String::new(),
            auto_reconnect: true,
            reconnect_period_seconds: 5,
        }
    }
}

impl LumenConfig {
    /// Load settings from `path`, falling back to defaults.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Self::default();
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read config, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str::<Self>(&text) {
            Ok(config) => config.normalized(),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to parse config, using defaults");
                Self::default()
            }
        }
    }

    /// Write settings as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.clone().normalized())
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;
        fs::write(path, json + "\n")
    }

    pub fn normalized(mut self) -> Self {
        self.port_path = self.port_path.trim().to_string();
        self.reconnect_period_seconds = self.reconnect_period_seconds.max(1);
        self
    }

    pub fn policy(&self) -> ReconnectPolicy {
        let seconds = u64::try_from(self.reconnect_period_seconds).unwrap_or(1);
        ReconnectPolicy::from_secs(self.auto_reconnect, seconds)
    }

    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings::new(self.port_path.clone(), self.policy())
    }
}
