use std::io;
use std::time::Duration;

use lumen_frame::{FrameConfig, FrameReader, FrameWriter};
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::{Connector, Link};

/// Baud rate the peripheral firmware listens at.
pub const DEFAULT_BAUD_RATE: u32 = 460_800;

/// Serial line settings.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Line speed. Default: 460800.
    pub baud_rate: u32,
    /// Driver-level timeout for a single read/write call.
    ///
    /// Writes treat an expired driver timeout as "not accepted yet" and keep
    /// going, so this bounds individual syscalls rather than a whole frame.
    pub io_timeout: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            io_timeout: Duration::from_secs(1),
        }
    }
}

/// Serial port transport.
///
/// Owns exactly one open 8N1 port without flow control and writes whole
/// frames to it. Dropping or closing the transport releases the device.
pub struct SerialTransport {
    path: String,
    writer: Option<FrameWriter<Box<dyn SerialPort>>>,
}

impl SerialTransport {
    /// Open the port at `path` with default settings.
    pub fn open(path: &str) -> Result<Self> {
        Self::open_with_config(path, &SerialConfig::default())
    }

    /// Open the port at `path` with explicit settings.
    pub fn open_with_config(path: &str, config: &SerialConfig) -> Result<Self> {
        let port = open_port(path, config)?;
        info!(port = path, baud = config.baud_rate, "serial port opened");
        Ok(Self {
            path: path.to_string(),
            writer: Some(FrameWriter::with_config(
                port,
                FrameConfig {
                    max_payload_size: u32::MAX as usize,
                },
            )),
        })
    }

    /// Open the port at `path` for reading frames (peripheral side).
    pub fn open_reader(
        path: &str,
        config: &SerialConfig,
    ) -> Result<FrameReader<Box<dyn SerialPort>>> {
        let port = open_port(path, config)?;
        info!(port = path, baud = config.baud_rate, "serial port opened for reading");
        Ok(FrameReader::new(port))
    }
}

impl Link for SerialTransport {
    fn port_path(&self) -> &str {
        &self.path
    }

    fn is_open(&self) -> bool {
        // A queue-status query fails once the device has been unplugged.
        self.writer
            .as_ref()
            .is_some_and(|writer| writer.get_ref().bytes_to_write().is_ok())
    }

    fn send(&mut self, path: &str, payload: &[u8]) -> Result<()> {
        if !self.is_open() {
            return Err(TransportError::NotOpen);
        }
        let writer = self.writer.as_mut().ok_or(TransportError::NotOpen)?;
        writer
            .send(path, payload)
            .map_err(TransportError::WriteFailed)
    }

    fn close(&mut self) {
        if self.writer.take().is_some() {
            debug!(port = %self.path, "serial port closed");
        }
    }
}

impl Drop for SerialTransport {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for SerialTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialTransport")
            .field("path", &self.path)
            .field("open", &self.writer.is_some())
            .finish()
    }
}

/// Opens [`SerialTransport`]s with fixed line settings.
#[derive(Debug, Clone, Default)]
pub struct SerialConnector {
    config: SerialConfig,
}

impl SerialConnector {
    /// Create a connector with explicit line settings.
    pub fn new(config: SerialConfig) -> Self {
        Self { config }
    }

    /// Line settings used for every open.
    pub fn config(&self) -> &SerialConfig {
        &self.config
    }
}

impl Connector for SerialConnector {
    type Link = SerialTransport;

    fn open(&self, port_path: &str) -> Result<SerialTransport> {
        SerialTransport::open_with_config(port_path, &self.config)
    }
}

fn open_port(path: &str, config: &SerialConfig) -> Result<Box<dyn SerialPort>> {
    serialport::new(path, config.baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(config.io_timeout)
        .open()
        .map_err(|err| open_error(path, err))
}

fn open_error(path: &str, err: serialport::Error) -> TransportError {
    match err.kind() {
        serialport::ErrorKind::NoDevice | serialport::ErrorKind::Io(io::ErrorKind::NotFound) => {
            TransportError::PortNotFound {
                path: path.to_string(),
            }
        }
        _ => TransportError::OpenFailed {
            path: path.to_string(),
            source: err.into(),
        },
    }
}
