//! Scripted [`NetdataApi`] fakes for tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use netwatch_client::{AlarmMap, ClientError, MetricsMap, NetdataApi};
use netwatch_types::{AlarmEntry, AlarmStatus, MetricSeries};
use parking_lot::Mutex;

/// Build a metrics map from `(series, units, [(dimension, value)])` tuples.
pub fn metrics(series: &[(&str, &str, &[(&str, f64)])]) -> MetricsMap {
    series
        .iter()
        .map(|(id, units, dims)| {
            let built = dims
                .iter()
                .fold(MetricSeries::builder(*units), |b, (name, value)| {
                    b.dimension(*name, *value)
                })
                .build();
            (id.to_string(), built)
        })
        .collect()
}

/// Build an alarm map from `(name, status, recipient)` tuples.
pub fn alarms(entries: &[(&str, AlarmStatus, &str)]) -> AlarmMap {
    entries
        .iter()
        .map(|(name, status, recipient)| {
            (name.to_string(), AlarmEntry::new(status.clone(), *recipient))
        })
        .collect()
}

/// Answers each fetch with the next scripted result.
///
/// Metrics and alarms have separate queues because a failed metrics fetch
/// means the alarms endpoint is never asked. Once a queue runs dry the
/// repeating response (if any) is used, otherwise a connection error.
#[derive(Debug, Default)]
pub struct ScriptedApi {
    metrics: Mutex<VecDeque<Result<MetricsMap, ClientError>>>,
    alarms: Mutex<VecDeque<Result<AlarmMap, ClientError>>>,
    repeat: Option<(MetricsMap, AlarmMap)>,
    metrics_calls: Arc<AtomicUsize>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer with these maps whenever the script is exhausted.
    pub fn repeating(mut self, metrics: MetricsMap, alarms: AlarmMap) -> Self {
        self.repeat = Some((metrics, alarms));
        self
    }

    /// Script a fully successful cycle.
    pub fn push_ok(&self, metrics: MetricsMap, alarms: AlarmMap) {
        self.push_metrics_ok(metrics);
        self.alarms.lock().push_back(Ok(alarms));
    }

    pub fn push_metrics_ok(&self, metrics: MetricsMap) {
        self.metrics.lock().push_back(Ok(metrics));
    }

    pub fn push_metrics_err(&self, err: ClientError) {
        self.metrics.lock().push_back(Err(err));
    }

    pub fn push_alarms_err(&self, err: ClientError) {
        self.alarms.lock().push_back(Err(err));
    }

    /// Counter of `fetch_metrics` calls, shared with the caller.
    pub fn metrics_calls(&self) -> Arc<AtomicUsize> {
        self.metrics_calls.clone()
    }

    fn exhausted() -> ClientError {
        ClientError::Connection("script exhausted".to_string())
    }
}

#[async_trait]
impl NetdataApi for ScriptedApi {
    async fn fetch_metrics(&self) -> Result<MetricsMap, ClientError> {
        self.metrics_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.metrics.lock().pop_front();
        match (next, &self.repeat) {
            (Some(result), _) => result,
            (None, Some((metrics, _))) => Ok(metrics.clone()),
            (None, None) => Err(Self::exhausted()),
        }
    }

    async fn fetch_alarms(&self) -> Result<AlarmMap, ClientError> {
        let next = self.alarms.lock().pop_front();
        match (next, &self.repeat) {
            (Some(result), _) => result,
            (None, Some((_, alarms))) => Ok(alarms.clone()),
            (None, None) => Err(Self::exhausted()),
        }
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

/// Succeeds with empty maps after sleeping, tracking concurrency.
#[derive(Debug)]
pub struct SlowApi {
    delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: Arc<AtomicUsize>,
    started: Arc<AtomicUsize>,
}

impl SlowApi {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            in_flight: AtomicUsize::new(0),
            max_in_flight: Arc::new(AtomicUsize::new(0)),
            started: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Highest number of requests ever in flight at once.
    pub fn max_in_flight(&self) -> Arc<AtomicUsize> {
        self.max_in_flight.clone()
    }

    /// Number of `fetch_metrics` calls started.
    pub fn started(&self) -> Arc<AtomicUsize> {
        self.started.clone()
    }

    async fn request(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl NetdataApi for SlowApi {
    async fn fetch_metrics(&self) -> Result<MetricsMap, ClientError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        self.request().await;
        Ok(MetricsMap::new())
    }

    async fn fetch_alarms(&self) -> Result<AlarmMap, ClientError> {
        self.request().await;
        Ok(AlarmMap::new())
    }
}
