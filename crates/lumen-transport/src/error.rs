use lumen_frame::FrameError;

/// Errors that can occur in serial transport operations.
///
/// Every variant is recoverable by reconnecting.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No device exists at the requested path.
    #[error("serial port not found: {path}")]
    PortNotFound { path: String },

    /// The device exists but could not be claimed (in use, permissions, settings).
    #[error("failed to open serial port {path}: {source}")]
    OpenFailed {
        path: String,
        source: std::io::Error,
    },

    /// The device stopped accepting a frame part-way.
    #[error("serial write failed: {0}")]
    WriteFailed(#[source] FrameError),

    /// The transport was closed or the device went away.
    #[error("serial port is not open")]
    NotOpen,

    /// Serial ports could not be listed.
    #[error("failed to enumerate serial ports: {0}")]
    Enumerate(std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;
