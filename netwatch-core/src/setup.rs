//! Setting hosts up and tearing them down.

use std::time::Duration;

use netwatch_client::NetdataApi;
use netwatch_types::DimensionKey;
use tracing::{info, warn};

use crate::cache::DEFAULT_WINDOW;
use crate::coordinator::Coordinator;
use crate::error::CoordinatorError;
use crate::registry::{CoordinatorRegistry, HostId};
use crate::sensor::{AlarmSensor, NetdataSensor, Sensor};

/// Everything needed to poll one netdata host.
#[derive(Debug, Clone, PartialEq)]
pub struct HostSpec {
    /// Display name prefix for the host's sensors.
    pub name: String,
    pub host: String,
    pub port: u16,
    pub interval: Duration,
    /// Keys exposed as sensors.
    pub resources: Vec<DimensionKey>,
    /// Keys whose readings are smoothed.
    pub filters: Vec<DimensionKey>,
    pub smoothing_window: usize,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
}

impl HostSpec {
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        interval: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            host: host.into(),
            port,
            interval,
            resources: Vec::new(),
            filters: Vec::new(),
            smoothing_window: DEFAULT_WINDOW,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn id(&self) -> HostId {
        HostId::new(self.host.clone(), self.port)
    }
}

/// Set a host up over HTTP.
#[cfg(feature = "http")]
pub async fn setup_host(
    spec: &HostSpec,
    registry: &CoordinatorRegistry,
) -> Result<Vec<Sensor>, CoordinatorError> {
    let client = netwatch_client::NetdataClient::builder()
        .host(spec.host.clone())
        .port(spec.port)
        .timeout(spec.timeout)
        .build()?;
    setup_with_api(spec, client, registry).await
}

/// Set a host up: poll once, create its sensors, then start polling.
///
/// Nothing is registered unless the first poll succeeds.
pub async fn setup_with_api(
    spec: &HostSpec,
    api: impl NetdataApi + 'static,
    registry: &CoordinatorRegistry,
) -> Result<Vec<Sensor>, CoordinatorError> {
    let id = spec.id();
    if registry.contains(&id) {
        return Err(CoordinatorError::AlreadyRegistered(id));
    }

    let mut coordinator = Coordinator::builder(api)
        .name(spec.name.clone())
        .interval(spec.interval)
        .smooth(spec.filters.iter().cloned())
        .window(spec.smoothing_window)
        .build()?;

    if let Err(err) = coordinator.first_refresh().await {
        warn!(host = %id, error = %err, "host setup failed");
        return Err(err);
    }

    let reader = coordinator.subscribe();
    let mut sensors: Vec<Sensor> = spec
        .resources
        .iter()
        .map(|key| NetdataSensor::new(&id, &spec.name, key.clone(), reader.clone()).into())
        .collect();
    sensors.push(AlarmSensor::new(&id, &spec.name, reader).into());

    registry.insert(id.clone(), coordinator.start())?;
    info!(host = %id, sensors = sensors.len(), "host set up");

    Ok(sensors)
}

/// Stop a host's coordinator and forget it. Returns `false` for unknown hosts.
pub async fn unload_host(id: &HostId, registry: &CoordinatorRegistry) -> bool {
    match registry.remove(id) {
        Some(handle) => {
            handle.shutdown().await;
            true
        }
        None => false,
    }
}
