//! # netwatch-core
//!
//! Polling coordination for netdata hosts.
//!
//! One [`Coordinator`] per host fetches the metric series and the alarm set
//! on a fixed interval, smooths selected dimensions over a short rolling
//! window and publishes the result as one immutable [`CoordinatorState`].
//! Sensor views read that state without blocking and never do I/O.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netwatch_core::{setup_host, CoordinatorRegistry, HostSpec};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = CoordinatorRegistry::new();
//!
//!     let mut spec = HostSpec::new("NAS", "nas.local", 19999, Duration::from_secs(1));
//!     spec.resources = vec!["system.cpu/user".parse()?];
//!
//!     // Polls once; fails without registering anything if the host is down.
//!     let sensors = setup_host(&spec, &registry).await?;
//!     for sensor in &sensors {
//!         println!("{}: {}", sensor.name(), sensor.value());
//!     }
//!
//!     registry.shutdown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Guarantees
//!
//! - Metrics and alarms in a published snapshot always come from one cycle
//! - A failed cycle keeps the previous snapshot published
//! - At most one cycle per host is in flight; slow cycles delay the next tick

pub mod alarm;
pub mod cache;
mod coordinator;
mod error;
mod registry;
pub mod sensor;
mod setup;
mod state;
pub mod units;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use alarm::aggregate_alarms;
pub use cache::SmoothingCache;
pub use coordinator::{Coordinator, CoordinatorBuilder, CoordinatorHandle};
pub use error::{CoordinatorError, ReadError};
pub use registry::{CoordinatorRegistry, HostId};
pub use sensor::{AlarmSensor, NetdataSensor, Sensor, SensorInfo, SensorValue};
pub use setup::{setup_with_api, unload_host, HostSpec};
pub use state::{CoordinatorState, CoordinatorStatus, StateReader};

#[cfg(feature = "http")]
pub use setup::setup_host;

// Re-export types for convenience
pub use netwatch_client::{ClientError, NetdataApi};
pub use netwatch_types::{AlarmSeverity, AlarmStatus, DimensionKey, Snapshot};
