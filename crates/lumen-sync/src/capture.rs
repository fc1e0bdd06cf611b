//! Main-thread capture handoff.
//!
//! Host state often lives on a thread the sync worker must not touch. The
//! worker posts a job to a [`MainThreadQueue`]; the host's main loop runs
//! queued jobs against the state it owns and the worker waits a bounded time
//! for the answer. A capture that times out, finds the queue gone, or panics
//! yields a fallback value instead of an error. Jobs whose requester has
//! already given up are dequeued without touching host state.

use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Weak};
use std::time::Duration;

use lumen_image::{Bitmap, TextureId, TextureSource};
use tracing::{debug, warn};

use crate::error::CaptureError;
use crate::snapshot::Snapshot;

type Job<H> = Box<dyn FnOnce(&mut H) + Send>;

/// What the sync worker needs from the host application.
///
/// Implementations are only ever called on the thread that services the
/// [`MainThreadQueue`], so they need not be `Send`.
pub trait HostState: TextureSource {
    /// Current player state, or [`Snapshot::default`] when there is no player.
    fn snapshot(&mut self) -> Snapshot;

    /// Texture holding the player's skin, if there is one.
    fn skin_texture_id(&mut self) -> Option<TextureId>;
}

/// Create a connected capture handle and main-thread queue.
pub fn main_thread_queue<H>() -> (CaptureHandle<H>, MainThreadQueue<H>) {
    let (tx, rx) = mpsc::channel();
    (CaptureHandle { tx }, MainThreadQueue { rx })
}

/// The consuming end, serviced by the host's main loop.
pub struct MainThreadQueue<H> {
    rx: Receiver<Job<H>>,
}

impl<H> MainThreadQueue<H> {
    /// Run every job queued so far. Returns how many ran.
    pub fn run_pending(&self, host: &mut H) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job(host);
            ran += 1;
        }
        ran
    }

    /// Wait up to `timeout` for a job, then run it and anything queued behind it.
    ///
    /// Returns how many jobs ran; zero on timeout or once every handle is gone.
    pub fn run_for(&self, host: &mut H, timeout: Duration) -> usize {
        match self.rx.recv_timeout(timeout) {
            Ok(job) => {
                job(host);
                1 + self.run_pending(host)
            }
            Err(_) => 0,
        }
    }
}

impl<H> std::fmt::Debug for MainThreadQueue<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MainThreadQueue").finish_non_exhaustive()
    }
}

/// The posting end, held by the sync worker.
pub struct CaptureHandle<H> {
    tx: Sender<Job<H>>,
}

impl<H> Clone for CaptureHandle<H> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<H> std::fmt::Debug for CaptureHandle<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureHandle").finish_non_exhaustive()
    }
}

impl<H: 'static> CaptureHandle<H> {
    /// Run `capture` on the main thread and wait up to `timeout` for its result.
    pub fn request<T, F>(&self, timeout: Duration, capture: F) -> Result<T, CaptureError>
    where
        T: Send + 'static,
        F: FnOnce(&mut H) -> T + Send + 'static,
    {
        let (done_tx, done_rx) = mpsc::sync_channel(1);
        // Dropped when this call returns; the job checks it before capturing.
        let waiting = Arc::new(());
        let requester: Weak<()> = Arc::downgrade(&waiting);
        let job: Job<H> = Box::new(move |host: &mut H| {
            if requester.upgrade().is_none() {
                debug!("skipping abandoned capture");
                return;
            }
            match panic::catch_unwind(AssertUnwindSafe(|| capture(host))) {
                // The requester may have timed out while the capture ran.
                Ok(value) => {
                    let _ = done_tx.send(value);
                }
                Err(_) => warn!("capture job panicked"),
            }
        });

        self.tx
            .send(job)
            .map_err(|_| CaptureError::Unavailable("main-thread queue closed"))?;

        let result = match done_rx.recv_timeout(timeout) {
            Ok(value) => Ok(value),
            Err(RecvTimeoutError::Timeout) => Err(CaptureError::Timeout(timeout)),
            Err(RecvTimeoutError::Disconnected) => {
                Err(CaptureError::Unavailable("capture job did not complete"))
            }
        };
        drop(waiting);
        result
    }

    /// Like [`request`](Self::request), substituting `T::default()` on failure.
    pub fn request_or_default<T, F>(&self, what: &'static str, timeout: Duration, capture: F) -> T
    where
        T: Default + Send + 'static,
        F: FnOnce(&mut H) -> T + Send + 'static,
    {
        self.request(timeout, capture).unwrap_or_else(|err| {
            debug!(capture = what, error = %err, "capture failed, using fallback");
            T::default()
        })
    }
}

impl<H: HostState + 'static> CaptureHandle<H> {
    /// Player state, or the default snapshot if capture fails.
    pub fn snapshot(&self, timeout: Duration) -> Snapshot {
        self.request_or_default("snapshot", timeout, |host: &mut H| host.snapshot())
    }

    /// The raw skin texture, or `None` if there is none or capture fails.
    pub fn skin_texture(&self, timeout: Duration) -> Option<Bitmap> {
        self.request_or_default("skin", timeout, capture_skin_texture::<H>)
    }
}

/// Load the current skin texture from host state.
///
/// Runs on the main thread. A missing player or an unloadable texture gives `None`.
pub fn capture_skin_texture<H: HostState>(host: &mut H) -> Option<Bitmap> {
    let id = host.skin_texture_id()?;
    match host.load_texture(&id) {
        Ok(bitmap) => Some(bitmap),
        Err(err) => {
            debug!(texture = %id, error = %err, "failed to load skin texture");
            None
        }
    }
}
