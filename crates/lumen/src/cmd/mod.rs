use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand};
use lumen_sync::GameMode;

use crate::config::DEFAULT_CONFIG_FILE;
use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod config;
pub mod listen;
pub mod ports;
pub mod run;
pub mod send;
pub mod skin;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List serial ports and the one auto-detection would pick.
    Ports(PortsArgs),
    /// Send a single frame.
    Send(SendArgs),
    /// Render a skin texture to the sync/skin payload.
    Skin(SkinArgs),
    /// Read frames from a port and print them.
    Listen(ListenArgs),
    /// Run the sync worker against a static player state.
    Run(RunArgs),
    /// Show or update the settings file.
    Config(ConfigArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Ports(args) => ports::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Skin(args) => skin::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Run(args) => run::run(args),
        Command::Config(args) => config::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Serial device to open.
    pub port: String,
    /// Frame path, e.g. sync or sync/skin.
    pub path: String,
    /// JSON payload.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub json: Option<String>,
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["json", "file"])]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["json", "data"])]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct SkinArgs {
    /// Skin texture (PNG, 64x64 or 64x32).
    pub png: PathBuf,
    /// Write the wire payload to this file.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
    /// Send the payload as a sync/skin frame to this serial device.
    #[arg(long, value_name = "PORT")]
    pub port: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    /// Serial device to read from.
    pub port: String,
    /// Only print frames on these paths (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub paths: Option<Vec<String>>,
    /// Exit after receiving N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Serial device; overrides the settings file.
    #[arg(long)]
    pub port: Option<String>,
    /// Settings file. Re-read when it changes.
    #[arg(long, value_name = "FILE", env = "LUMEN_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
    /// Skin texture to stream (PNG).
    #[arg(long, value_name = "PNG")]
    pub skin: Option<PathBuf>,
    /// Game mode to report.
    #[arg(long, default_value = "unknown")]
    pub mode: GameMode,
    /// Health to report.
    #[arg(long, default_value_t = 20.0)]
    pub health: f64,
    /// Maximum health to report.
    #[arg(long, default_value_t = 20.0)]
    pub max_health: f64,
    /// Player state period (e.g. 1s, 500ms).
    #[arg(long, default_value = "1s")]
    pub state_period: String,
    /// Skin period (e.g. 20s).
    #[arg(long, default_value = "20s")]
    pub skin_period: String,
    /// Stop after this long instead of waiting for Ctrl-C.
    #[arg(long)]
    pub duration: Option<String>,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Settings file.
    #[arg(long, value_name = "FILE", env = "LUMEN_CONFIG", default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
    /// Set the serial device (empty string clears it).
    #[arg(long)]
    pub port: Option<String>,
    /// Enable or disable automatic reconnects.
    #[arg(long, value_name = "BOOL")]
    pub auto_reconnect: Option<bool>,
    /// Seconds between reconnect attempts (minimum 1).
    #[arg(long, value_name = "SECONDS")]
    pub reconnect_period: Option<i64>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}
