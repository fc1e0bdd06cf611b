//! The background sync loop.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use lumen_frame::{SYNC, SYNC_SKIN};
use lumen_image::{render_skin, SkinPayload};
use lumen_transport::Connector;
use tracing::{debug, info, warn};

use crate::capture::{CaptureHandle, HostState};
use crate::error::{Result, SyncError};
use crate::manager::{ConnectionManager, SendOutcome};
use crate::settings::PortResolver;

/// Name of the background sync thread.
pub const WORKER_THREAD_NAME: &str = "lumen-serial-sync";

/// How often each payload is sampled and how long a capture may take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    /// Player state period. Default: 1s.
    pub state_period: Duration,
    /// Skin bitmap period. Default: 20s.
    pub skin_period: Duration,
    /// Longest wait for a state capture. Default: 2s.
    pub state_timeout: Duration,
    /// Longest wait for a skin capture. Default: 5s.
    pub skin_timeout: Duration,
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            state_period: Duration::from_secs(1),
            skin_period: Duration::from_secs(20),
            state_timeout: Duration::from_secs(2),
            skin_timeout: Duration::from_secs(5),
        }
    }
}

/// Capture player state and send it as a `sync` frame.
///
/// Returns `None` if nothing was handed to the manager.
pub fn sync_state<C, R, H>(
    manager: &mut ConnectionManager<C, R>,
    capture: &CaptureHandle<H>,
    timeout: Duration,
) -> Option<SendOutcome>
where
    C: Connector,
    R: PortResolver,
    H: HostState + 'static,
{
    let snapshot = capture.snapshot(timeout);
    match snapshot.to_json() {
        Ok(json) => Some(manager.send(SYNC, &json)),
        Err(err) => {
            debug!(error = %err, "failed to encode player state");
            None
        }
    }
}

/// Capture the skin texture, render it and send it as a `sync/skin` frame.
///
/// An absent or unrenderable skin sends nothing and returns `None`.
pub fn sync_skin<C, R, H>(
    manager: &mut ConnectionManager<C, R>,
    capture: &CaptureHandle<H>,
    timeout: Duration,
) -> Option<SendOutcome>
where
    C: Connector,
    R: PortResolver,
    H: HostState + 'static,
{
    let payload = match capture.skin_texture(timeout) {
        Some(texture) => render_skin(&texture).unwrap_or_else(|err| {
            debug!(error = %err, "failed to render skin");
            SkinPayload::empty()
        }),
        None => SkinPayload::empty(),
    };

    let wire = payload.to_wire_bytes();
    if wire.is_empty() {
        return None;
    }
    Some(manager.send(SYNC_SKIN, &wire))
}

/// Owns the `lumen-serial-sync` thread.
///
/// The thread stops at its next wakeup after [`shutdown`](Self::shutdown)
/// or drop, closing the connection on the way out.
#[derive(Debug)]
pub struct SyncWorker {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl SyncWorker {
    /// Start the sync loop on a dedicated thread.
    ///
    /// Both payloads fire immediately, then repeat at their periods. A tick
    /// that falls behind skips the missed periods instead of bursting.
    pub fn spawn<C, R, H>(
        manager: ConnectionManager<C, R>,
        capture: CaptureHandle<H>,
        schedule: Schedule,
    ) -> Result<Self>
    where
        C: Connector + 'static,
        R: PortResolver + 'static,
        H: HostState + 'static,
    {
        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                let mut manager = manager;
                let start = Instant::now();
                let mut next_state = start;
                let mut next_skin = start;
                info!(
                    state_period_ms = schedule.state_period.as_millis() as u64,
                    skin_period_ms = schedule.skin_period.as_millis() as u64,
                    "sync worker started"
                );

                loop {
                    let now = Instant::now();
                    if now >= next_state {
                        sync_state(&mut manager, &capture, schedule.state_timeout);
                        next_state = next_deadline(next_state, schedule.state_period, Instant::now());
                    }
                    if now >= next_skin {
                        sync_skin(&mut manager, &capture, schedule.skin_timeout);
                        next_skin = next_deadline(next_skin, schedule.skin_period, Instant::now());
                    }

                    let wait = next_state
                        .min(next_skin)
                        .saturating_duration_since(Instant::now());
                    match stop_rx.recv_timeout(wait) {
                        Err(RecvTimeoutError::Timeout) => {}
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }

                manager.close();
                info!("sync worker stopped");
            })
            .map_err(SyncError::Spawn)?;

        Ok(Self {
            stop: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// True until the thread has exited.
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Stop the loop and wait for the thread to exit.
    pub fn shutdown(mut self) {
        self.stop_and_join();
    }

    fn stop_and_join(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("sync worker panicked");
            }
        }
    }
}

impl Drop for SyncWorker {
    fn drop(&mut self) {
        self.stop_and_join();
    }
}

/// Stand-in deadline for periods too long to add to an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(u32::MAX as u64);

/// First deadline after `now` on the grid `prev + k * period`.
///
/// Never panics: a deadline past what `Instant` can represent becomes
/// [`FAR_FUTURE`] from `now`.
fn next_deadline(prev: Instant, period: Duration, now: Instant) -> Instant {
    let period = period.max(Duration::from_millis(1));
    let next = match prev.checked_add(period) {
        Some(next) if next > now => Some(next),
        Some(_) => {
            let missed = now.duration_since(prev).as_nanos() / period.as_nanos();
            let steps = u32::try_from(missed + 1).unwrap_or(u32::MAX);
            prev.checked_add(period.saturating_mul(steps))
        }
        None => None,
    };
    next.unwrap_or_else(|| far_future(now))
}

fn far_future(now: Instant) -> Instant {
    now.checked_add(FAR_FUTURE)
        .or_else(|| now.checked_add(Duration::from_secs(86_400)))
        .unwrap_or(now)
}
