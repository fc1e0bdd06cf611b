//! Connection settings shared between the host and the sync worker.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tracing::debug;

/// Reconnect interval used when none is configured.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(5);

/// Shortest reconnect interval the manager honors.
pub const MIN_RECONNECT_INTERVAL: Duration = Duration::from_secs(1);

/// When the manager may retry after a failed or lost connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Retry after the first attempt. When false, only one open is ever tried.
    pub auto_reconnect: bool,
    interval: Duration,
}

impl ReconnectPolicy {
    /// Create a policy. Intervals below one second are raised to one second.
    pub fn new(auto_reconnect: bool, interval: Duration) -> Self {
        Self {
            auto_reconnect,
            interval: interval.max(MIN_RECONNECT_INTERVAL),
        }
    }

    /// Create a policy from a whole-second interval, as stored in settings files.
    pub fn from_secs(auto_reconnect: bool, seconds: u64) -> Self {
        Self::new(auto_reconnect, Duration::from_secs(seconds))
    }

    /// A policy that never retries after the first attempt.
    pub fn disabled() -> Self {
        Self::new(false, DEFAULT_RECONNECT_INTERVAL)
    }

    /// Minimum time between two open attempts.
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(true, DEFAULT_RECONNECT_INTERVAL)
    }
}

/// Everything the connection manager reads at the start of a send.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Configured device path. Blank means "resolve from the environment".
    pub port_path: String,
    pub policy: ReconnectPolicy,
}

impl ConnectionSettings {
    pub fn new(port_path: impl Into<String>, policy: ReconnectPolicy) -> Self {
        Self {
            port_path: port_path.into(),
            policy,
        }
    }
}

/// Cloneable, thread-safe handle to live [`ConnectionSettings`].
///
/// The worker reads through one clone while the host updates through another.
#[derive(Debug, Clone, Default)]
pub struct SettingsHandle {
    inner: Arc<Mutex<ConnectionSettings>>,
}

impl SettingsHandle {
    pub fn new(settings: ConnectionSettings) -> Self {
        Self {
            inner: Arc::new(Mutex::new(settings)),
        }
    }

    /// Copy of the current settings.
    pub fn get(&self) -> ConnectionSettings {
        // A poisoned lock still holds a complete value.
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the port path and reconnect policy.
    ///
    /// Takes effect on the next send; a changed target closes the current
    /// connection there.
    pub fn reconfigure(&self, port_path: impl Into<String>, policy: ReconnectPolicy) {
        let settings = ConnectionSettings::new(port_path, policy);
        debug!(
            port = %settings.port_path,
            auto_reconnect = policy.auto_reconnect,
            interval_secs = policy.interval().as_secs(),
            "connection settings updated"
        );
        *self.inner.lock().unwrap_or_else(PoisonError::into_inner) = settings;
    }
}

impl From<ConnectionSettings> for SettingsHandle {
    fn from(settings: ConnectionSettings) -> Self {
        Self::new(settings)
    }
}

/// Turns the configured port path into the device to connect to.
pub trait PortResolver: Send {
    /// `None` (or a blank path) means no port is available.
    fn resolve(&self, configured: &str) -> Option<String>;
}

impl<F> PortResolver for F
where
    F: Fn(&str) -> Option<String> + Send,
{
    fn resolve(&self, configured: &str) -> Option<String> {
        self(configured)
    }
}

/// Resolves through configuration, `LUMEN_SERIAL_PORT`, then auto-detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemResolver;

impl PortResolver for SystemResolver {
    fn resolve(&self, configured: &str) -> Option<String> {
        lumen_transport::resolve_port_path(configured)
    }
}
