//! Serial transport for the Lumen link.
//!
//! Provides the blocking serial transport used to reach the peripheral:
//! - [`SerialTransport`] owns one open port and writes whole frames to it
//! - [`Link`] / [`Connector`] abstract the transport for the connection manager
//! - [`locator`] resolves which port to use (config, environment, auto-detection)
//!
//! This is the lowest I/O layer of Lumen. Everything else builds on top of
//! the [`Link`] trait provided here.

pub mod error;
pub mod locator;
pub mod serial;
pub mod traits;

pub use error::{Result, TransportError};
pub use locator::{auto_detect_port, list_ports, resolve_port_path, PORT_ENV_VAR};
pub use serial::{SerialConfig, SerialConnector, SerialTransport, DEFAULT_BAUD_RATE};
pub use traits::{Connector, Link};
