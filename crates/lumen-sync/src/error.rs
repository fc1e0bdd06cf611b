use std::time::Duration;

/// Errors that can occur while setting up synchronization.
///
/// Once the worker runs, nothing it does produces an error for the caller.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The background worker thread could not be started.
    #[error("failed to spawn sync worker: {0}")]
    Spawn(#[source] std::io::Error),

    /// JSON serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a main-thread capture produced no value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// The main loop did not run the job in time.
    #[error("capture timed out after {0:?}")]
    Timeout(Duration),

    /// The main-thread queue is gone, or the job panicked before completing.
    #[error("capture unavailable: {0}")]
    Unavailable(&'static str),
}

pub type Result<T> = std::result::Result<T, SyncError>;
