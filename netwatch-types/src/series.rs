//! Metric series as reported by the netdata `allmetrics` endpoint.

use std::collections::BTreeMap;

/// Metric series keyed by their dotted id (e.g. `net.eth0`).
pub type MetricsMap = BTreeMap<String, MetricSeries>;

/// A named metric stream with one or more dimensions.
///
/// Series are produced fresh on every poll and never mutated in place
/// afterwards; the previous poll's instance is simply dropped.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricSeries {
    /// Unit string as reported by netdata (e.g. `kilobits/s`, `percentage`).
    pub units: String,

    /// Dimension values keyed by dimension name (e.g. `received`, `sent`).
    pub dimensions: BTreeMap<String, Dimension>,
}

impl MetricSeries {
    /// Create an empty series with the given unit.
    pub fn new(units: impl Into<String>) -> Self {
        Self {
            units: units.into(),
            dimensions: BTreeMap::new(),
        }
    }

    /// Create a builder for a series.
    pub fn builder(units: impl Into<String>) -> MetricSeriesBuilder {
        MetricSeriesBuilder::new(units)
    }

    /// Current value of a dimension.
    ///
    /// Returns `None` if the dimension is missing or netdata reported no value.
    pub fn value(&self, dimension: &str) -> Option<f64> {
        self.dimensions.get(dimension).and_then(|d| d.value)
    }

    /// Check if the series has a dimension with this name.
    pub fn has_dimension(&self, dimension: &str) -> bool {
        self.dimensions.contains_key(dimension)
    }
}

/// A single value within a series.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimension {
    /// Latest value. Netdata emits `null` for dimensions without data yet.
    #[cfg_attr(feature = "serde", serde(default))]
    pub value: Option<f64>,
}

impl Dimension {
    /// Create a dimension with a value.
    pub fn new(value: f64) -> Self {
        Self { value: Some(value) }
    }
}

/// Builder for `MetricSeries`.
#[derive(Debug)]
pub struct MetricSeriesBuilder {
    series: MetricSeries,
}

impl MetricSeriesBuilder {
    /// Create a new builder.
    pub fn new(units: impl Into<String>) -> Self {
        Self {
            series: MetricSeries::new(units),
        }
    }

    /// Add a dimension with a value.
    pub fn dimension(mut self, name: impl Into<String>, value: f64) -> Self {
        self.series.dimensions.insert(name.into(), Dimension::new(value));
        self
    }

    /// Add a dimension that has no value yet.
    pub fn empty_dimension(mut self, name: impl Into<String>) -> Self {
        self.series
            .dimensions
            .insert(name.into(), Dimension::default());
        self
    }

    /// Build the series.
    pub fn build(self) -> MetricSeries {
        self.series
    }
}
