//! In-memory links for exercising the manager and worker without hardware.

use std::sync::{Arc, Mutex, MutexGuard};

use lumen_frame::FrameError;
use lumen_transport::{Connector, Link, Result, TransportError};

#[derive(Debug, Default)]
pub(crate) struct FakeState {
    /// Every port an open was attempted on, in order.
    pub opens: Vec<String>,
    /// Frames accepted, as (port, path, payload).
    pub frames: Vec<(String, String, Vec<u8>)>,
    pub closes: usize,
    pub fail_open: bool,
    pub fail_send: bool,
    /// Makes every live link report not-open.
    pub unplugged: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeConnector {
    state: Arc<Mutex<FakeState>>,
}

impl FakeConnector {
    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }
}

impl Connector for FakeConnector {
    type Link = FakeLink;

    fn open(&self, port_path: &str) -> Result<FakeLink> {
        let mut state = self.state();
        state.opens.push(port_path.to_string());
        if state.fail_open {
            return Err(TransportError::PortNotFound {
                path: port_path.to_string(),
            });
        }
        state.unplugged = false;
        Ok(FakeLink {
            port: port_path.to_string(),
            open: true,
            state: Arc::clone(&self.state),
        })
    }
}

#[derive(Debug)]
pub(crate) struct FakeLink {
    port: String,
    open: bool,
    state: Arc<Mutex<FakeState>>,
}

impl Link for FakeLink {
    fn port_path(&self) -> &str {
        &self.port
    }

    fn is_open(&self) -> bool {
        self.open && !self.state.lock().unwrap().unplugged
    }

    fn send(&mut self, path: &str, payload: &[u8]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_send {
            return Err(TransportError::WriteFailed(FrameError::ConnectionClosed));
        }
        state
            .frames
            .push((self.port.clone(), path.to_string(), payload.to_vec()));
        Ok(())
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.state.lock().unwrap().closes += 1;
        }
    }
}
