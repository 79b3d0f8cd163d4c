//! Application state: the registry of running hosts and their sensors.

use std::sync::Arc;

use netwatch_core::{
    setup_with_api, CoordinatorError, CoordinatorRegistry, CoordinatorState, HostId, HostSpec,
    NetdataApi, Sensor, StateReader,
};
use tracing::{info, warn};

/// A host whose first poll succeeded.
#[derive(Debug)]
pub struct HostEntry {
    pub spec: HostSpec,
    pub sensors: Vec<Sensor>,
}

impl HostEntry {
    pub fn id(&self) -> HostId {
        self.spec.id()
    }
}

/// A host that could not be set up.
#[derive(Debug, Clone)]
pub struct FailedHost {
    pub id: HostId,
    pub name: String,
    pub error: String,
}

/// Owns the coordinator registry and every sensor created from it.
#[derive(Debug, Default)]
pub struct App {
    registry: CoordinatorRegistry,
    hosts: Vec<HostEntry>,
    failed: Vec<FailedHost>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set up every host over HTTP. Hosts that fail are recorded and skipped.
    pub async fn setup(specs: Vec<HostSpec>) -> Self {
        let mut app = Self::new();
        for spec in specs {
            app.add_host(spec).await;
        }
        app
    }

    /// Set up one host over HTTP. Returns whether it is now running.
    pub async fn add_host(&mut self, spec: HostSpec) -> bool {
        let result = netwatch_core::setup_host(&spec, &self.registry).await;
        self.record(spec, result)
    }

    /// Set up one host through a given api.
    pub async fn add_host_with_api(
        &mut self,
        spec: HostSpec,
        api: impl NetdataApi + 'static,
    ) -> bool {
        let result = setup_with_api(&spec, api, &self.registry).await;
        self.record(spec, result)
    }

    fn record(&mut self, spec: HostSpec, result: Result<Vec<Sensor>, CoordinatorError>) -> bool {
        match result {
            Ok(sensors) => {
                info!(host = %spec.id(), name = %spec.name, "host ready");
                self.hosts.push(HostEntry { spec, sensors });
                true
            }
            Err(err) => {
                warn!(host = %spec.id(), error = %err, "skipping host");
                self.failed.push(FailedHost {
                    id: spec.id(),
                    name: spec.name,
                    error: err.to_string(),
                });
                false
            }
        }
    }

    pub fn hosts(&self) -> &[HostEntry] {
        &self.hosts
    }

    pub fn failed(&self) -> &[FailedHost] {
        &self.failed
    }

    pub fn registry(&self) -> &CoordinatorRegistry {
        &self.registry
    }

    /// Latest published state for a running host.
    pub fn state(&self, id: &HostId) -> Option<Arc<CoordinatorState>> {
        self.registry.state(id)
    }

    /// One reader per running host, for waiting on publications.
    pub fn subscribe_all(&self) -> Vec<StateReader> {
        self.hosts
            .iter()
            .filter_map(|h| self.registry.subscribe(&h.id()))
            .collect()
    }

    /// Stop every coordinator.
    pub async fn shutdown(&self) {
        self.registry.shutdown().await;
    }
}
