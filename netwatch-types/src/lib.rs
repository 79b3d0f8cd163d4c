//! # netwatch-types
//!
//! Core types shared by the netwatch crates. These describe what a netdata
//! daemon reports (metric series and alarms) and the unit of state the
//! coordinator publishes after every poll (a [`Snapshot`]).
//!
//! ## Features
//!
//! - `serde`: (de)serialization via serde. The netdata wire format maps
//!   directly onto [`MetricSeries`] and [`AlarmEntry`] when enabled.
//!
//! ## Example
//!
//! ```rust
//! use netwatch_types::{AlarmStatus, DimensionKey, Snapshot};
//!
//! let snapshot = Snapshot::builder()
//!     .series("net.eth0", "kilobits/s", |s| {
//!         s.dimension("received", 8192.0).dimension("sent", -512.0)
//!     })
//!     .alarm("ram_in_use", AlarmStatus::Clear, "sysadmin")
//!     .build();
//!
//! let key: DimensionKey = "net.eth0/received".parse().unwrap();
//! assert_eq!(snapshot.dimension_value(&key), Some(8192.0));
//! ```

mod alarm;
mod key;
mod series;
mod snapshot;

pub use alarm::*;
pub use key::*;
pub use series::*;
pub use snapshot::*;
