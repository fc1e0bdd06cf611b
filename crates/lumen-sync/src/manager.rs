//! Connection lifecycle for the single peripheral link.
//!
//! The manager is Disconnected (no link) or Connected (a live link bound to
//! one port). A Disconnected manager that has already tried once is backing
//! off until the reconnect interval passes. Every `send` runs the state
//! machine once:
//! 1. resolve the desired port; none available drops the frame
//! 2. a dead link or a changed target closes the current link
//! 3. when disconnected, attempt one open if the policy allows it
//! 4. forward the frame; a failed write closes the link and loses the frame

use std::fmt;
use std::time::Instant;

use lumen_transport::{Connector, Link};
use tracing::{debug, info, trace};

use crate::settings::{
    ConnectionSettings, PortResolver, ReconnectPolicy, SettingsHandle, SystemResolver,
};

/// Why a frame was not delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// No port is configured, set in the environment, or detected.
    NotConfigured,
    /// The last open attempt is more recent than the reconnect interval.
    BackingOff,
    /// The one allowed open attempt has already been made.
    ReconnectDisabled,
    /// The open attempt made for this frame failed.
    OpenFailed,
    /// The link failed mid-write and was closed.
    SendFailed,
}

impl DropReason {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::BackingOff => "backing_off",
            Self::ReconnectDisabled => "reconnect_disabled",
            Self::OpenFailed => "open_failed",
            Self::SendFailed => "send_failed",
        }
    }
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one [`ConnectionManager::send`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Sent,
    Dropped(DropReason),
}

impl SendOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, Self::Sent)
    }
}

/// Owns the link to the peripheral and decides when to (re)connect.
///
/// Not internally synchronized: one thread performs every send. Settings are
/// shared through a [`SettingsHandle`] and may change from any thread.
pub struct ConnectionManager<C: Connector, R = SystemResolver> {
    connector: C,
    resolver: R,
    settings: SettingsHandle,
    link: Option<C::Link>,
    last_attempt: Option<Instant>,
}

impl<C: Connector> ConnectionManager<C> {
    /// Create a manager resolving ports through config, environment and auto-detection.
    pub fn new(connector: C, settings: impl Into<SettingsHandle>) -> Self {
        Self::with_resolver(connector, settings, SystemResolver)
    }
}

impl<C: Connector, R: PortResolver> ConnectionManager<C, R> {
    /// Create a manager with a custom port resolver.
    pub fn with_resolver(connector: C, settings: impl Into<SettingsHandle>, resolver: R) -> Self {
        Self {
            connector,
            resolver,
            settings: settings.into(),
            link: None,
            last_attempt: None,
        }
    }

    /// Handle for updating settings from other threads.
    pub fn settings_handle(&self) -> SettingsHandle {
        self.settings.clone()
    }

    /// Current settings.
    pub fn settings(&self) -> ConnectionSettings {
        self.settings.get()
    }

    /// Replace the port path and reconnect policy; applied on the next send.
    pub fn reconfigure(&self, port_path: impl Into<String>, policy: ReconnectPolicy) {
        self.settings.reconfigure(port_path, policy);
    }

    /// True while a link is held and reports open.
    pub fn is_connected(&self) -> bool {
        self.link.as_ref().is_some_and(Link::is_open)
    }

    /// Port of the held link, if any.
    pub fn connected_path(&self) -> Option<&str> {
        self.link.as_ref().map(Link::port_path)
    }

    /// Deliver one frame, connecting first if needed and allowed.
    ///
    /// Never blocks on more than one open attempt plus one write and never
    /// fails; the outcome only says whether the frame went out.
    pub fn send(&mut self, path: &str, payload: &[u8]) -> SendOutcome {
        self.send_at(path, payload, Instant::now())
    }

    pub(crate) fn send_at(&mut self, path: &str, payload: &[u8], now: Instant) -> SendOutcome {
        let settings = self.settings.get();
        let target = self
            .resolver
            .resolve(&settings.port_path)
            .map(|target| target.trim().to_string())
            .filter(|target| !target.is_empty());
        let Some(target) = target else {
            trace!(path, "no serial port available, dropping frame");
            return SendOutcome::Dropped(DropReason::NotConfigured);
        };

        let stale = match &self.link {
            Some(link) if !link.is_open() => Some("device no longer open"),
            Some(link) if link.port_path() != target => Some("target changed"),
            _ => None,
        };
        if let Some(reason) = stale {
            self.disconnect(reason);
        }

        if self.link.is_none() {
            match self.open_link(&target, settings.policy, now) {
                Ok(link) => self.link = Some(link),
                Err(reason) => return SendOutcome::Dropped(reason),
            }
        }

        let result = match self.link.as_mut() {
            Some(link) => link.send(path, payload),
            None => return SendOutcome::Dropped(DropReason::OpenFailed),
        };
        match result {
            Ok(()) => {
                trace!(port = %target, path, bytes = payload.len(), "frame sent");
                SendOutcome::Sent
            }
            Err(err) => {
                debug!(port = %target, path, error = %err, "serial send failed, closing connection");
                self.disconnect("send failed");
                SendOutcome::Dropped(DropReason::SendFailed)
            }
        }
    }

    /// Close the link if one is held. Idempotent.
    pub fn close(&mut self) {
        self.disconnect("closed");
    }

    fn open_link(
        &mut self,
        target: &str,
        policy: ReconnectPolicy,
        now: Instant,
    ) -> Result<C::Link, DropReason> {
        if let Some(last) = self.last_attempt {
            if !policy.auto_reconnect {
                return Err(DropReason::ReconnectDisabled);
            }
            if now.saturating_duration_since(last) < policy.interval() {
                return Err(DropReason::BackingOff);
            }
        }

        self.last_attempt = Some(now);
        match self.connector.open(target) {
            Ok(link) => {
                info!(port = target, "connected to peripheral");
                Ok(link)
            }
            Err(err) => {
                debug!(port = target, error = %err, "failed to open serial port");
                Err(DropReason::OpenFailed)
            }
        }
    }

    fn disconnect(&mut self, reason: &'static str) {
        if let Some(mut link) = self.link.take() {
            link.close();
            info!(port = link.port_path(), reason, "disconnected from peripheral");
        }
    }
}

impl<C: Connector, R> Drop for ConnectionManager<C, R> {
    fn drop(&mut self) {
        if let Some(mut link) = self.link.take() {
            link.close();
        }
    }
}

impl<C: Connector, R> fmt::Debug for ConnectionManager<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("connected_path", &self.link.as_ref().map(Link::port_path))
            .field("last_attempt", &self.last_attempt)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::testing::FakeConnector;

    type Resolver = fn(&str) -> Option<String>;

    fn as_configured(configured: &str) -> Option<String> {
        Some(configured.to_string())
    }

    fn manager(
        connector: &FakeConnector,
        port: &str,
        policy: ReconnectPolicy,
    ) -> ConnectionManager<FakeConnector, Resolver> {
        ConnectionManager::with_resolver(
            connector.clone(),
            ConnectionSettings::new(port, policy),
            as_configured as Resolver,
        )
    }

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn first_attempt_is_immediate() {
        let connector = FakeConnector::default();
        let mut manager = manager(&connector, "/dev/ttyACM0", ReconnectPolicy::default());

        assert_eq!(manager.send("sync", b"{}"), SendOutcome::Sent);
        assert!(manager.is_connected());
        assert_eq!(manager.connected_path(), Some("/dev/ttyACM0"));

        let state = connector.state();
        assert_eq!(state.opens, vec!["/dev/ttyACM0"]);
        assert_eq!(
            state.frames,
            vec![("/dev/ttyACM0".to_string(), "sync".to_string(), b"{}".to_vec())]
        );
    }

    #[test]
    fn blank_target_drops_without_opening() {
        let connector = FakeConnector::default();
        let mut manager = manager(&connector, "   ", ReconnectPolicy::default());

        assert_eq!(
            manager.send("sync", b"{}"),
            SendOutcome::Dropped(DropReason::NotConfigured)
        );
        assert!(connector.state().opens.is_empty());
    }

    #[test]
    fn unresolvable_target_drops_without_opening() {
        let connector = FakeConnector::default();
        let mut manager = ConnectionManager::with_resolver(
            connector.clone(),
            ConnectionSettings::default(),
            |_: &str| -> Option<String> { None },
        );

        assert_eq!(
            manager.send("sync", b"{}"),
            SendOutcome::Dropped(DropReason::NotConfigured)
        );
        assert!(connector.state().opens.is_empty());
    }

    #[test]
    fn disabled_reconnect_never_reopens_after_failure() {
        let connector = FakeConnector::default();
        connector.state().fail_open = true;
        let mut manager = manager(&connector, "/dev/ttyACM0", ReconnectPolicy::disabled());
        let t0 = Instant::now();

        assert_eq!(
            manager.send_at("sync", b"{}", t0),
            SendOutcome::Dropped(DropReason::OpenFailed)
        );
        connector.state().fail_open = false;
        for later in [1, 10, 3600] {
            assert_eq!(
                manager.send_at("sync", b"{}", t0 + secs(later)),
                SendOutcome::Dropped(DropReason::ReconnectDisabled)
            );
        }
        assert_eq!(connector.state().opens.len(), 1);
    }

    #[test]
    fn failed_open_backs_off_for_the_interval() {
        let connector = FakeConnector::default();
        connector.state().fail_open = true;
        let mut manager = manager(
            &connector,
            "/dev/ttyACM0",
            ReconnectPolicy::new(true, secs(5)),
        );
        let t0 = Instant::now();

        assert_eq!(
            manager.send_at("sync", b"{}", t0),
            SendOutcome::Dropped(DropReason::OpenFailed)
        );
        for later in 1..5 {
            assert_eq!(
                manager.send_at("sync", b"{}", t0 + secs(later)),
                SendOutcome::Dropped(DropReason::BackingOff)
            );
        }
        assert_eq!(connector.state().opens.len(), 1);

        assert_eq!(
            manager.send_at("sync", b"{}", t0 + secs(5)),
            SendOutcome::Dropped(DropReason::OpenFailed)
        );
        assert_eq!(connector.state().opens.len(), 2);

        connector.state().fail_open = false;
        assert_eq!(
            manager.send_at("sync", b"{}", t0 + secs(10)),
            SendOutcome::Sent
        );
        assert_eq!(connector.state().opens.len(), 3);
    }

    #[test]
    fn target_change_reconnects_to_new_port() {
        let connector = FakeConnector::default();
        let mut manager = manager(&connector, "/dev/ttyACM0", ReconnectPolicy::default());
        let t0 = Instant::now();
        assert!(manager.send_at("sync", b"a", t0).is_sent());

        manager
            .settings_handle()
            .reconfigure("/dev/ttyACM1", ReconnectPolicy::default());
        assert_eq!(
            manager.send_at("sync", b"b", t0 + secs(6)),
            SendOutcome::Sent
        );

        let state = connector.state();
        assert_eq!(state.opens, vec!["/dev/ttyACM0", "/dev/ttyACM1"]);
        assert_eq!(state.closes, 1);
        assert_eq!(state.frames[1].0, "/dev/ttyACM1");
        drop(state);
        assert_eq!(manager.connected_path(), Some("/dev/ttyACM1"));
    }

    #[test]
    fn failed_send_closes_and_next_send_reopens_after_backoff() {
        let connector = FakeConnector::default();
        let mut manager = manager(
            &connector,
            "/dev/ttyACM0",
            ReconnectPolicy::new(true, secs(5)),
        );
        let t0 = Instant::now();
        assert!(manager.send_at("sync", b"a", t0).is_sent());

        connector.state().fail_send = true;
        assert_eq!(
            manager.send_at("sync", b"b", t0 + secs(1)),
            SendOutcome::Dropped(DropReason::SendFailed)
        );
        assert!(!manager.is_connected());
        assert_eq!(connector.state().closes, 1);

        connector.state().fail_send = false;
        assert_eq!(
            manager.send_at("sync", b"c", t0 + secs(2)),
            SendOutcome::Dropped(DropReason::BackingOff)
        );
        assert_eq!(manager.send_at("sync", b"d", t0 + secs(5)), SendOutcome::Sent);

        let state = connector.state();
        assert_eq!(state.opens.len(), 2);
        let payloads: Vec<&[u8]> = state.frames.iter().map(|f| f.2.as_slice()).collect();
        assert_eq!(payloads, vec![b"a".as_slice(), b"d".as_slice()]);
    }

    #[test]
    fn unplugged_device_is_detected_before_send() {
        let connector = FakeConnector::default();
        let mut manager = manager(&connector, "/dev/ttyACM0", ReconnectPolicy::default());
        let t0 = Instant::now();
        assert!(manager.send_at("sync", b"a", t0).is_sent());

        connector.state().unplugged = true;
        assert!(!manager.is_connected());
        assert_eq!(
            manager.send_at("sync", b"b", t0 + secs(1)),
            SendOutcome::Dropped(DropReason::BackingOff)
        );
        assert_eq!(connector.state().closes, 1);
        assert_eq!(manager.connected_path(), None);

        assert!(manager.send_at("sync", b"c", t0 + secs(5)).is_sent());
        assert_eq!(connector.state().opens.len(), 2);
    }

    #[test]
    fn blank_target_keeps_existing_link() {
        let connector = FakeConnector::default();
        let mut manager = manager(&connector, "/dev/ttyACM0", ReconnectPolicy::default());
        assert!(manager.send("sync", b"a").is_sent());

        manager.reconfigure("", ReconnectPolicy::default());
        assert_eq!(
            manager.send("sync", b"b"),
            SendOutcome::Dropped(DropReason::NotConfigured)
        );
        assert!(manager.is_connected());
    }

    #[test]
    fn close_is_idempotent_and_drop_closes() {
        let connector = FakeConnector::default();
        let mut manager = manager(&connector, "/dev/ttyACM0", ReconnectPolicy::default());
        assert!(manager.send("sync", b"a").is_sent());

        manager.close();
        manager.close();
        assert_eq!(connector.state().closes, 1);

        assert!(manager.send_at("sync", b"b", Instant::now() + secs(5)).is_sent());
        drop(manager);
        assert_eq!(connector.state().closes, 2);
    }

    #[test]
    fn drop_reasons_have_stable_names() {
        assert_eq!(DropReason::BackingOff.to_string(), "backing_off");
        assert_eq!(DropReason::NotConfigured.as_str(), "not_configured");
    }
}
