//! Host-side synchronization with the Lumen peripheral.
//!
//! This is the "just works" layer: hand it a [`Connector`](lumen_transport::Connector),
//! a [`CaptureHandle`] into the host's main loop and a [`Schedule`], and the
//! [`SyncWorker`] keeps the peripheral fed with player state and the skin
//! bitmap. Transport and capture failures never surface to the caller; they
//! turn into dropped frames or fallback values.

pub mod capture;
pub mod error;
pub mod manager;
pub mod settings;
pub mod snapshot;
pub mod worker;

#[cfg(test)]
mod testing;

pub use capture::{
    capture_skin_texture, main_thread_queue, CaptureHandle, HostState, MainThreadQueue,
};
pub use error::{CaptureError, Result, SyncError};
pub use manager::{ConnectionManager, DropReason, SendOutcome};
pub use settings::{
    ConnectionSettings, PortResolver, ReconnectPolicy, SettingsHandle, SystemResolver,
    DEFAULT_RECONNECT_INTERVAL, MIN_RECONNECT_INTERVAL,
};
pub use snapshot::{GameMode, ParseGameModeError, Snapshot};
pub use worker::{sync_skin, sync_state, Schedule, SyncWorker, WORKER_THREAD_NAME};
