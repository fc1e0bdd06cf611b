use crate::error::Result;

/// An open, frame-oriented connection to the peripheral.
///
/// Implementations are not internally synchronized; the owner serializes
/// every call.
pub trait Link: Send {
    /// The device path this link was opened on.
    fn port_path(&self) -> &str;

    /// Whether the underlying device is still usable.
    ///
    /// Polled before every send, so it should reflect live device state.
    fn is_open(&self) -> bool;

    /// Encode and write one frame, blocking until the whole frame is accepted.
    fn send(&mut self, path: &str, payload: &[u8]) -> Result<()>;

    /// Release the device. Idempotent and infallible.
    fn close(&mut self);
}

/// Opens links by device path.
pub trait Connector: Send {
    /// The link type produced by this connector.
    type Link: Link;

    /// Open a link to the device at `port_path`.
    fn open(&self, port_path: &str) -> Result<Self::Link>;
}
