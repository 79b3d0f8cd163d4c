//! Explicit registry of running coordinators, one per netdata host.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::info;

use crate::coordinator::CoordinatorHandle;
use crate::error::CoordinatorError;
use crate::state::{CoordinatorState, StateReader};

/// Identifies a netdata host.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HostId {
    pub host: String,
    pub port: u16,
}

impl HostId {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for HostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Owns the running coordinators of a process.
///
/// The registry is created by the host process and passed by reference to
/// whatever sets hosts up or tears them down.
///
/// # Example
///
/// ```rust
/// use netwatch_core::{CoordinatorRegistry, HostId};
///
/// let registry = CoordinatorRegistry::new();
/// assert!(registry.is_empty());
/// assert!(!registry.contains(&HostId::new("localhost", 19999)));
/// ```
#[derive(Debug, Default)]
pub struct CoordinatorRegistry {
    coordinators: Mutex<BTreeMap<HostId, CoordinatorHandle>>,
}

impl CoordinatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a running coordinator for `id`.
    ///
    /// Fails if the host already has one; the rejected handle is dropped,
    /// which stops it.
    pub fn insert(&self, id: HostId, handle: CoordinatorHandle) -> Result<(), CoordinatorError> {
        let mut coordinators = self.coordinators.lock();
        if coordinators.contains_key(&id) {
            return Err(CoordinatorError::AlreadyRegistered(id));
        }
        info!(host = %id, "coordinator registered");
        coordinators.insert(id, handle);
        Ok(())
    }

    pub fn contains(&self, id: &HostId) -> bool {
        self.coordinators.lock().contains_key(id)
    }

    /// Latest published state of a host's coordinator.
    pub fn state(&self, id: &HostId) -> Option<Arc<CoordinatorState>> {
        self.coordinators.lock().get(id).map(|h| h.state())
    }

    /// A reader on a host's coordinator.
    pub fn subscribe(&self, id: &HostId) -> Option<StateReader> {
        self.coordinators.lock().get(id).map(|h| h.subscribe())
    }

    /// Ask a host's coordinator to poll now. Returns `false` for unknown hosts.
    pub fn request_refresh(&self, id: &HostId) -> bool {
        match self.coordinators.lock().get(id) {
            Some(handle) => {
                handle.request_refresh();
                true
            }
            None => false,
        }
    }

    /// Remove and stop a host's coordinator.
    pub fn remove(&self, id: &HostId) -> Option<CoordinatorHandle> {
        let handle = self.coordinators.lock().remove(id)?;
        handle.stop();
        info!(host = %id, "coordinator removed");
        Some(handle)
    }

    pub fn hosts(&self) -> Vec<HostId> {
        self.coordinators.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.coordinators.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.coordinators.lock().is_empty()
    }

    /// Stop every coordinator and wait for their loops to exit.
    pub async fn shutdown(&self) {
        let drained: Vec<_> = std::mem::take(&mut *self.coordinators.lock())
            .into_iter()
            .collect();

        for (id, handle) in drained {
            handle.shutdown().await;
            info!(host = %id, "coordinator shut down");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::Coordinator;
    use crate::testing::{alarms, metrics, ScriptedApi};
    use std::time::Duration;

    fn running() -> CoordinatorHandle {
        let api = ScriptedApi::new().repeating(metrics(&[]), alarms(&[]));
        Coordinator::builder(api)
            .interval(Duration::from_secs(1))
            .build()
            .unwrap()
            .start()
    }

    #[test]
    fn host_id_display() {
        assert_eq!(HostId::new("nas", 19999).to_string(), "nas:19999");
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_host_is_rejected() {
        let registry = CoordinatorRegistry::new();
        let id = HostId::new("nas", 19999);

        registry.insert(id.clone(), running()).unwrap();
        let err = registry.insert(id.clone(), running()).unwrap_err();
        assert!(matches!(err, CoordinatorError::AlreadyRegistered(ref h) if *h == id));
        assert_eq!(registry.len(), 1);

        // Same host on another port is a different daemon.
        registry.insert(HostId::new("nas", 20000), running()).unwrap();
        assert_eq!(registry.len(), 2);

        registry.shutdown().await;
        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn remove_stops_the_coordinator() {
        let registry = CoordinatorRegistry::new();
        let id = HostId::new("nas", 19999);
        registry.insert(id.clone(), running()).unwrap();
        assert!(registry.contains(&id));
        assert!(registry.state(&id).is_some());

        let handle = registry.remove(&id).unwrap();
        assert!(!registry.contains(&id));
        assert!(!registry.request_refresh(&id));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn request_refresh_reaches_the_coordinator() {
        let registry = CoordinatorRegistry::new();
        let id = HostId::new("nas", 19999);
        registry.insert(id.clone(), running()).unwrap();
        let mut reader = registry.subscribe(&id).unwrap();

        assert!(registry.request_refresh(&id));
        assert!(reader.changed().await);
        assert_eq!(reader.current().cycles, 1);

        registry.shutdown().await;
    }
}
