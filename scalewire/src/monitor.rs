//! Background weight monitoring
//!
//! While a scale is connected a poll task keeps reading whatever the scale
//! streams and publishes every result. It runs only while the monitoring flag
//! is on and parks on the flag otherwise.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use scalewire_types::Reading;

use crate::link::Link;

/// Poll task state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// No poll task running
    Idle,

    /// Poll task running (it may be parked on the monitoring flag)
    Polling,

    /// Disconnect requested, waiting for the poll task to finish
    Cancelling,
}

/// Shared monitoring controls
///
/// Cheap to clone (Arc internally). Every clone sees the same flag, delay and
/// state.
#[derive(Debug, Clone)]
pub struct MonitorHandle {
    inner: Arc<MonitorInner>,
}

#[derive(Debug)]
struct MonitorInner {
    /// Monitoring flag; the poll task waits on changes
    monitoring: watch::Sender<bool>,

    /// Delay between polls in milliseconds
    delay_ms: AtomicU64,

    state: parking_lot::RwLock<PollState>,
}

impl MonitorHandle {
    pub fn new(monitoring: bool, delay: Duration) -> Self {
        let (monitoring, _) = watch::channel(monitoring);

        Self {
            inner: Arc::new(MonitorInner {
                monitoring,
                delay_ms: AtomicU64::new(duration_ms(delay)),
                state: parking_lot::RwLock::new(PollState::Idle),
            }),
        }
    }

    /// Check if background polling is enabled
    pub fn is_monitoring(&self) -> bool {
        *self.inner.monitoring.borrow()
    }

    /// Enable or disable background polling
    ///
    /// Takes effect at the next poll; a read already in flight completes.
    pub fn set_monitoring(&self, enabled: bool) {
        let previous = self.inner.monitoring.send_replace(enabled);
        if previous != enabled {
            debug!("Monitoring {}", if enabled { "enabled" } else { "disabled" });
        }
    }

    /// Delay between polls
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.inner.delay_ms.load(Ordering::Acquire))
    }

    pub fn set_delay(&self, delay: Duration) {
        self.inner.delay_ms.store(duration_ms(delay), Ordering::Release);
    }

    /// Get current poll task state
    pub fn state(&self) -> PollState {
        *self.inner.state.read()
    }

    pub(crate) fn set_state(&self, state: PollState) {
        *self.inner.state.write() = state;
    }

    /// Turn monitoring off until the returned guard is dropped
    pub(crate) fn pause(&self) -> MonitorPause {
        let saved = self.inner.monitoring.send_replace(false);
        trace!("Monitoring paused (was {})", saved);

        MonitorPause {
            handle: self.clone(),
            saved,
        }
    }

    fn watch(&self) -> watch::Receiver<bool> {
        self.inner.monitoring.subscribe()
    }
}

fn duration_ms(delay: Duration) -> u64 {
    u64::try_from(delay.as_millis()).unwrap_or(u64::MAX)
}

/// Restores the monitoring flag saved by [`MonitorHandle::pause`]
#[must_use]
pub(crate) struct MonitorPause {
    handle: MonitorHandle,
    saved: bool,
}

impl Drop for MonitorPause {
    fn drop(&mut self) {
        self.handle.inner.monitoring.send_replace(self.saved);
        trace!("Monitoring restored to {}", self.saved);
    }
}

/// Poll task body
pub(crate) struct Poller {
    pub link: Arc<Mutex<Link>>,
    pub monitor: MonitorHandle,
    pub events: broadcast::Sender<Reading>,
    pub cancel: CancellationToken,
}

impl Poller {
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        let mut flag = self.monitor.watch();

        debug!("Poll task started");

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            if !*flag.borrow_and_update() {
                tokio::select! {
                    _ = self.cancel.cancelled() => break,
                    changed = flag.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        continue;
                    }
                }
            }

            if !self.poll_once().await {
                continue;
            }

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = sleep(self.monitor.delay()) => {}
            }
        }

        self.monitor.set_state(PollState::Idle);
        debug!("Poll task stopped");
    }

    /// One monitoring read, returns false if it was skipped
    ///
    /// Only reads: a streaming scale sends frames on its own.
    async fn poll_once(&self) -> bool {
        let mut link = self.link.lock().await;

        // Disconnect or a manual read may have won the lock
        if self.cancel.is_cancelled() || !self.monitor.is_monitoring() {
            return false;
        }

        let outcome = link.read_frame().await;
        if let Err(e) = &outcome {
            warn!("Monitoring read from {} failed: {}", link.remote_addr(), e);
        }

        let reading = link.reading(&outcome);
        drop(link);

        trace!("{}", reading);
        // No subscribers is fine
        let _ = self.events.send(reading);

        true
    }
}
