//! Published coordinator state and the read side used by sensor views.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use netwatch_client::ClientError;
use netwatch_types::{DimensionKey, Snapshot};
use tokio::sync::watch;

/// Health of a coordinator's polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinatorStatus {
    /// No cycle has succeeded yet.
    Idle,
    /// The last cycle succeeded.
    Healthy,
    /// The last cycle failed; an older snapshot is still published.
    Degraded,
}

impl CoordinatorStatus {
    /// Status after a cycle with the given outcome.
    pub fn after_cycle(self, succeeded: bool) -> Self {
        match (self, succeeded) {
            (_, true) => CoordinatorStatus::Healthy,
            (CoordinatorStatus::Idle, false) => CoordinatorStatus::Idle,
            (_, false) => CoordinatorStatus::Degraded,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CoordinatorStatus::Idle => "idle",
            CoordinatorStatus::Healthy => "healthy",
            CoordinatorStatus::Degraded => "degraded",
        }
    }
}

impl fmt::Display for CoordinatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a coordinator publishes after a cycle.
///
/// Instances are immutable once published; the coordinator swaps in a new
/// `Arc` rather than mutating the old one, so readers always see the result
/// of one complete cycle.
#[derive(Debug, Clone)]
pub struct CoordinatorState {
    pub status: CoordinatorStatus,
    /// Last successfully fetched snapshot.
    pub snapshot: Option<Arc<Snapshot>>,
    /// Smoothed readings for seeded keys, taken when `snapshot` was ingested.
    pub smoothed: Arc<BTreeMap<DimensionKey, f64>>,
    pub last_success: Option<Instant>,
    pub last_error: Option<ClientError>,
    /// Completed cycles, successful or not.
    pub cycles: u64,
    pub failures: u64,
}

impl CoordinatorState {
    /// State before the first cycle.
    pub fn idle() -> Self {
        Self {
            status: CoordinatorStatus::Idle,
            snapshot: None,
            smoothed: Arc::new(BTreeMap::new()),
            last_success: None,
            last_error: None,
            cycles: 0,
            failures: 0,
        }
    }

    /// Whether the published snapshot came from the most recent cycle.
    pub fn is_fresh(&self) -> bool {
        self.status == CoordinatorStatus::Healthy
    }

    /// Smoothed reading for a key, if the key is smoothed and has been seeded.
    pub fn smoothed(&self, key: &DimensionKey) -> Option<f64> {
        self.smoothed.get(key).copied()
    }
}

impl Default for CoordinatorState {
    fn default() -> Self {
        Self::idle()
    }
}

/// Cheap, cloneable read access to a coordinator's published state.
///
/// Reads never block on I/O and never trigger a fetch.
#[derive(Debug, Clone)]
pub struct StateReader {
    receiver: watch::Receiver<Arc<CoordinatorState>>,
}

impl StateReader {
    pub(crate) fn new(receiver: watch::Receiver<Arc<CoordinatorState>>) -> Self {
        Self { receiver }
    }

    /// The most recently published state.
    pub fn current(&self) -> Arc<CoordinatorState> {
        self.receiver.borrow().clone()
    }

    /// Wait until the coordinator publishes again.
    ///
    /// Returns `false` once the coordinator is gone.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_stays_idle_on_failure() {
        assert_eq!(
            CoordinatorStatus::Idle.after_cycle(false),
            CoordinatorStatus::Idle
        );
    }

    #[test]
    fn success_always_leads_to_healthy() {
        for status in [
            CoordinatorStatus::Idle,
            CoordinatorStatus::Healthy,
            CoordinatorStatus::Degraded,
        ] {
            assert_eq!(status.after_cycle(true), CoordinatorStatus::Healthy);
        }
    }

    #[test]
    fn failure_after_data_degrades() {
        assert_eq!(
            CoordinatorStatus::Healthy.after_cycle(false),
            CoordinatorStatus::Degraded
        );
        assert_eq!(
            CoordinatorStatus::Degraded.after_cycle(false),
            CoordinatorStatus::Degraded
        );
    }

    #[test]
    fn idle_state_has_no_data() {
        let state = CoordinatorState::idle();
        assert!(state.snapshot.is_none());
        assert!(!state.is_fresh());
        assert_eq!(state.smoothed(&DimensionKey::new("a", "b")), None);
    }

    #[tokio::test]
    async fn reader_sees_replaced_state() {
        let (tx, rx) = watch::channel(Arc::new(CoordinatorState::idle()));
        let mut reader = StateReader::new(rx);

        let mut next = CoordinatorState::idle();
        next.status = CoordinatorStatus::Healthy;
        tx.send_replace(Arc::new(next));

        assert!(reader.changed().await);
        assert_eq!(reader.current().status, CoordinatorStatus::Healthy);

        drop(tx);
        assert!(!reader.changed().await);
    }
}
