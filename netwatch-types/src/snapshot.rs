//! Snapshot - the (metrics, alarms) pair from a single poll cycle.

use crate::{
    AlarmEntry, AlarmMap, AlarmStatus, DimensionKey, MetricSeries, MetricSeriesBuilder, MetricsMap,
};

/// One poll cycle's worth of daemon state.
///
/// Metrics and alarms inside a snapshot always originate from the same
/// cycle. A new cycle produces a new snapshot; existing snapshots are never
/// patched.
///
/// # Example
///
/// ```rust
/// use netwatch_types::{AlarmStatus, Snapshot};
///
/// let snapshot = Snapshot::builder()
///     .series("system.cpu", "percentage", |s| s.dimension("user", 4.2))
///     .alarm("cpu_usage", AlarmStatus::Warning, "sysadmin")
///     .build();
///
/// assert_eq!(snapshot.metrics.len(), 1);
/// assert_eq!(snapshot.alarms.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Unix timestamp in milliseconds when the cycle completed.
    pub timestamp_ms: u64,

    /// Metric series keyed by series id.
    pub metrics: MetricsMap,

    /// Alarms keyed by alarm name.
    pub alarms: AlarmMap,
}

impl Snapshot {
    /// Create a snapshot from freshly fetched maps, stamped with the current time.
    pub fn new(metrics: MetricsMap, alarms: AlarmMap) -> Self {
        Self {
            timestamp_ms: current_timestamp_ms(),
            metrics,
            alarms,
        }
    }

    /// Create a builder for constructing snapshots.
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }

    /// Get a series by id.
    pub fn series(&self, id: &str) -> Option<&MetricSeries> {
        self.metrics.get(id)
    }

    /// Look up the current value for a dimension key.
    pub fn dimension_value(&self, key: &DimensionKey) -> Option<f64> {
        self.series(&key.series)?.value(&key.dimension)
    }
}

/// Builder for constructing `Snapshot` instances.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    timestamp_ms: Option<u64>,
    metrics: MetricsMap,
    alarms: AlarmMap,
}

impl SnapshotBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a specific timestamp (milliseconds since Unix epoch).
    pub fn timestamp_ms(mut self, ts: u64) -> Self {
        self.timestamp_ms = Some(ts);
        self
    }

    /// Add a series with dimensions built using a closure.
    pub fn series<F>(mut self, id: impl Into<String>, units: impl Into<String>, f: F) -> Self
    where
        F: FnOnce(MetricSeriesBuilder) -> MetricSeriesBuilder,
    {
        let series = f(MetricSeriesBuilder::new(units)).build();
        self.metrics.insert(id.into(), series);
        self
    }

    /// Add an alarm.
    pub fn alarm(
        mut self,
        name: impl Into<String>,
        status: AlarmStatus,
        recipient: impl Into<String>,
    ) -> Self {
        self.alarms.insert(name.into(), AlarmEntry::new(status, recipient));
        self
    }

    /// Build the snapshot.
    pub fn build(self) -> Snapshot {
        Snapshot {
            timestamp_ms: self.timestamp_ms.unwrap_or_else(current_timestamp_ms),
            metrics: self.metrics,
            alarms: self.alarms,
        }
    }
}

/// Get current timestamp in milliseconds since Unix epoch.
fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
