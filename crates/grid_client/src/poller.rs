//! Interval-driven progress polling.
//!
//! [`ProgressPoller::start`] spawns a task that requests the progress document
//! immediately and then once per interval. Every tick issues its own request,
//! so a slow response never delays the next one; whichever resolves last is
//! what the consumer sees. Results are applied through a snapshot slot whose
//! lock is shared with [`PollHandle::stop`], so nothing is published once a
//! handle has been stopped, even if its request was already in flight.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use grid_core::{BatchId, BatchProgress};
use grid_logging::{grid_debug, grid_trace, grid_warn};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{BatchApi, PollError};

/// Where a poll cycle stands for the consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// No batch is being watched.
    Idle,
    /// Polling, but no successful response yet.
    PollingNoData,
    /// Polling with at least one snapshot received.
    PollingWithData,
}

#[derive(Clone)]
pub struct ProgressPoller {
    api: Arc<dyn BatchApi>,
    interval: Duration,
}

impl ProgressPoller {
    /// A zero interval is raised to one millisecond.
    pub fn new(api: Arc<dyn BatchApi>, interval: Duration) -> Self {
        Self {
            api,
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts polling `batch_id`. Must be called from within a tokio runtime.
    pub fn start(&self, batch_id: BatchId) -> PollHandle {
        let (tx, rx) = watch::channel(None);
        let slot = Arc::new(SnapshotSlot::new(tx));
        let cancel = CancellationToken::new();

        grid_debug!("Polling batch {} every {:?}", batch_id, self.interval);
        tokio::spawn(poll_loop(
            self.api.clone(),
            batch_id.clone(),
            self.interval,
            slot.clone(),
            cancel.clone(),
        ));

        PollHandle {
            batch_id,
            slot,
            rx,
            cancel,
        }
    }
}

/// Owner of one running poll cycle. Dropping it stops the cycle.
pub struct PollHandle {
    batch_id: BatchId,
    slot: Arc<SnapshotSlot>,
    rx: watch::Receiver<Option<BatchProgress>>,
    cancel: CancellationToken,
}

impl PollHandle {
    pub fn batch_id(&self) -> &BatchId {
        &self.batch_id
    }

    /// Most recent snapshot, or `None` before the first successful poll.
    pub fn latest(&self) -> Option<BatchProgress> {
        self.rx.borrow().clone()
    }

    /// Receiver notified every time a new snapshot is applied.
    pub fn subscribe(&self) -> watch::Receiver<Option<BatchProgress>> {
        self.rx.clone()
    }

    pub fn is_active(&self) -> bool {
        self.slot.is_active()
    }

    pub fn state(&self) -> PollState {
        if !self.is_active() {
            PollState::Idle
        } else if self.rx.borrow().is_some() {
            PollState::PollingWithData
        } else {
            PollState::PollingNoData
        }
    }

    /// Stops polling. No snapshot is applied after this returns.
    pub fn stop(&self) {
        if self.slot.deactivate() {
            grid_debug!("Stopping progress polling for batch {}", self.batch_id);
        }
        self.cancel.cancel();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Consumer-side controller that watches at most one batch at a time.
pub struct BatchMonitor {
    poller: ProgressPoller,
    current: Option<PollHandle>,
}

impl BatchMonitor {
    pub fn new(poller: ProgressPoller) -> Self {
        Self {
            poller,
            current: None,
        }
    }

    /// Points the monitor at `batch_id`; `None` or a blank id stops polling.
    ///
    /// Watching the batch that is already being polled keeps the running
    /// cycle. Any other change stops the old cycle before starting a new one
    /// with an empty snapshot.
    pub fn watch(&mut self, batch_id: Option<BatchId>) {
        let batch_id = batch_id.filter(|id| !id.is_blank());
        if self.batch_id() == batch_id.as_ref() {
            return;
        }
        if let Some(previous) = self.current.take() {
            previous.stop();
        }
        self.current = batch_id.map(|id| self.poller.start(id));
    }

    pub fn stop(&mut self) {
        self.watch(None);
    }

    pub fn batch_id(&self) -> Option<&BatchId> {
        self.current.as_ref().map(PollHandle::batch_id)
    }

    pub fn latest(&self) -> Option<BatchProgress> {
        self.current.as_ref().and_then(PollHandle::latest)
    }

    pub fn subscribe(&self) -> Option<watch::Receiver<Option<BatchProgress>>> {
        self.current.as_ref().map(PollHandle::subscribe)
    }

    pub fn state(&self) -> PollState {
        self.current
            .as_ref()
            .map_or(PollState::Idle, PollHandle::state)
    }
}

struct SnapshotSlot {
    active: Mutex<bool>,
    tx: watch::Sender<Option<BatchProgress>>,
}

impl SnapshotSlot {
    fn new(tx: watch::Sender<Option<BatchProgress>>) -> Self {
        Self {
            active: Mutex::new(true),
            tx,
        }
    }

    fn is_active(&self) -> bool {
        *self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns whether the slot was active before the call.
    fn deactivate(&self) -> bool {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *active, false)
    }

    /// Replaces the snapshot unless the slot was stopped. Returns whether it applied.
    fn apply(&self, progress: BatchProgress) -> bool {
        let active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        if !*active {
            return false;
        }
        self.tx.send_replace(Some(progress));
        true
    }
}

async fn poll_loop(
    api: Arc<dyn BatchApi>,
    batch_id: BatchId,
    period: Duration,
    slot: Arc<SnapshotSlot>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // Dropping the set on exit aborts requests still in flight.
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let api = api.clone();
                let batch_id = batch_id.clone();
                let slot = slot.clone();
                in_flight.spawn(async move {
                    poll_once(api.as_ref(), &batch_id, &slot).await;
                });
            }
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
        }
    }

    grid_trace!(
        "Poll loop for batch {} exited with {} request(s) in flight",
        batch_id,
        in_flight.len()
    );
}

async fn poll_once(api: &dyn BatchApi, batch_id: &BatchId, slot: &SnapshotSlot) {
    match api.fetch_progress(batch_id).await {
        Ok(progress) => {
            let percent = progress.percent;
            if slot.apply(progress) {
                grid_trace!("Batch {} progress {}%", batch_id, percent);
            } else {
                grid_debug!("Discarding progress for stopped batch {}", batch_id);
            }
        }
        Err(PollError::NotFound) => {
            grid_debug!("Batch {} not registered yet", batch_id);
        }
        Err(err) => {
            grid_warn!("Progress poll for batch {} failed: {}", batch_id, err);
        }
    }
}
