//! # netwatch-client
//!
//! Fetches metric series and alarms from a running netdata daemon.
//!
//! The coordinator in `netwatch-core` only depends on the [`NetdataApi`]
//! trait, so the HTTP transport can be swapped for a scripted fake in tests.
//! Each call performs exactly one request and never retries; retry policy
//! belongs to the caller.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use netwatch_client::{NetdataApi, NetdataClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NetdataClient::builder()
//!         .host("localhost")
//!         .port(19999)
//!         .build()?;
//!
//!     let metrics = client.fetch_metrics().await?;
//!     let alarms = client.fetch_alarms().await?;
//!
//!     println!("{} series, {} alarms", metrics.len(), alarms.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod parse;

#[cfg(feature = "http")]
pub mod netdata;

use async_trait::async_trait;

pub use error::ClientError;
pub use parse::{parse_alarms, parse_metrics};

#[cfg(feature = "http")]
pub use netdata::{NetdataClient, NetdataClientBuilder};

// Re-export types for convenience
pub use netwatch_types::{AlarmEntry, AlarmMap, AlarmStatus, MetricSeries, MetricsMap};

/// Path and fixed query of the all-metrics endpoint.
pub const ALLMETRICS_PATH: &str =
    "/api/v1/allmetrics?format=json&help=no&types=no&timestamps=yes&names=yes&data=average";

/// Path and fixed query of the alarms endpoint.
pub const ALARMS_PATH: &str = "/api/v1/alarms?all&format=json";

/// Read access to a netdata daemon.
///
/// Implementations return either a fully parsed structure or a
/// [`ClientError`]; partial results are never returned.
#[async_trait]
pub trait NetdataApi: Send + Sync {
    /// Fetch the current value of every metric series.
    async fn fetch_metrics(&self) -> Result<MetricsMap, ClientError>;

    /// Fetch every alarm definition with its current status.
    async fn fetch_alarms(&self) -> Result<AlarmMap, ClientError>;

    /// Human-readable description of the remote, used in log lines.
    fn describe(&self) -> String {
        "netdata".to_string()
    }
}
