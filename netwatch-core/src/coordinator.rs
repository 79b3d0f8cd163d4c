//! The update coordinator: one poll loop per netdata host.

use std::sync::Arc;
use std::time::{Duration, Instant};

use netwatch_client::{AlarmMap, ClientError, MetricsMap, NetdataApi};
use netwatch_types::{DimensionKey, Snapshot};
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{SmoothingCache, DEFAULT_WINDOW};
use crate::error::CoordinatorError;
use crate::state::{CoordinatorState, CoordinatorStatus, StateReader};

/// Polls a netdata daemon and publishes one consistent state per cycle.
///
/// The coordinator is the single writer of both the published snapshot and
/// the smoothing cache. Sensor views read through a [`StateReader`].
///
/// # Example
///
/// ```rust,no_run
/// use netwatch_client::NetdataClient;
/// use netwatch_core::Coordinator;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = NetdataClient::builder().host("localhost").build()?;
///
///     let mut coordinator = Coordinator::builder(client)
///         .name("nas")
///         .interval(Duration::from_secs(1))
///         .smooth(["net.eth0/received".parse()?])
///         .build()?;
///
///     // No entities without data: the first cycle must succeed.
///     coordinator.first_refresh().await?;
///
///     let handle = coordinator.start();
///     let state = handle.state();
///     println!("status: {}", state.status);
///
///     handle.shutdown().await;
///     Ok(())
/// }
/// ```
pub struct Coordinator {
    api: Arc<dyn NetdataApi>,
    name: String,
    interval: Duration,
    cache: SmoothingCache,
    state_tx: watch::Sender<Arc<CoordinatorState>>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator")
            .field("name", &self.name)
            .field("interval", &self.interval)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

type CycleResult = Result<(MetricsMap, AlarmMap), ClientError>;

impl Coordinator {
    /// Create a builder for a coordinator polling through `api`.
    pub fn builder(api: impl NetdataApi + 'static) -> CoordinatorBuilder {
        CoordinatorBuilder::new(Arc::new(api))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// The most recently published state.
    pub fn state(&self) -> Arc<CoordinatorState> {
        self.state_tx.borrow().clone()
    }

    /// A reader for sensor views.
    pub fn subscribe(&self) -> StateReader {
        StateReader::new(self.state_tx.subscribe())
    }

    /// Run the first cycle.
    ///
    /// A failure here, with nothing ever published, is a setup failure.
    pub async fn first_refresh(&mut self) -> Result<(), CoordinatorError> {
        match self.refresh().await {
            Ok(()) => Ok(()),
            Err(source) if self.state().status == CoordinatorStatus::Idle => {
                Err(CoordinatorError::Setup {
                    name: self.name.clone(),
                    source,
                })
            }
            Err(_) => Ok(()),
        }
    }

    /// Run one cycle now and publish its outcome.
    ///
    /// The error is returned for the caller's information only; the
    /// previous snapshot stays published either way.
    pub async fn refresh(&mut self) -> Result<(), ClientError> {
        let outcome = self.fetch().await;
        self.apply(outcome)
    }

    /// Spawn the poll loop.
    ///
    /// The first timed cycle runs one interval from now. A cycle that
    /// outlasts the interval delays the next tick; cycles never overlap.
    pub fn start(mut self) -> CoordinatorHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let refresh = Arc::new(Notify::new());
        let refresh_signal = refresh.clone();
        let reader = self.subscribe();
        let interval = self.interval;

        info!(coordinator = %self.name, ?interval, "starting coordinator");

        let task = tokio::spawn(async move {
            let mut timer =
                tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = timer.tick() => {}
                    _ = refresh_signal.notified() => {
                        timer.reset();
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                        continue;
                    }
                }

                let outcome = self.fetch().await;

                // Stopped while the fetch was in flight: drop the result.
                if *stop_rx.borrow() || stop_rx.has_changed().is_err() {
                    debug!(coordinator = %self.name, "discarding cycle completed after stop");
                    break;
                }

                let _ = self.apply(outcome);
            }

            info!(coordinator = %self.name, "coordinator stopped");
        });

        CoordinatorHandle {
            stop_tx,
            refresh,
            reader,
            task,
        }
    }

    /// Fetch metrics then alarms, sequentially.
    async fn fetch(&self) -> CycleResult {
        let metrics = self.api.fetch_metrics().await?;
        let alarms = self.api.fetch_alarms().await?;
        Ok((metrics, alarms))
    }

    fn apply(&mut self, outcome: CycleResult) -> Result<(), ClientError> {
        let previous = self.state();

        let (next, result) = match outcome {
            Ok((metrics, alarms)) => {
                let snapshot = Snapshot::new(metrics, alarms);
                self.ingest(&snapshot);

                debug!(
                    coordinator = %self.name,
                    series = snapshot.metrics.len(),
                    alarms = snapshot.alarms.len(),
                    "cycle succeeded"
                );

                let next = CoordinatorState {
                    status: previous.status.after_cycle(true),
                    snapshot: Some(Arc::new(snapshot)),
                    smoothed: Arc::new(self.cache.readings()),
                    last_success: Some(Instant::now()),
                    last_error: None,
                    cycles: previous.cycles + 1,
                    failures: previous.failures,
                };
                (next, Ok(()))
            }
            Err(err) => {
                warn!(
                    coordinator = %self.name,
                    remote = %self.api.describe(),
                    error = %err,
                    "cycle failed, keeping previous snapshot"
                );

                let next = CoordinatorState {
                    status: previous.status.after_cycle(false),
                    snapshot: previous.snapshot.clone(),
                    smoothed: previous.smoothed.clone(),
                    last_success: previous.last_success,
                    last_error: Some(err.clone()),
                    cycles: previous.cycles + 1,
                    failures: previous.failures + 1,
                };
                (next, Err(err))
            }
        };

        if next.status != previous.status {
            info!(
                coordinator = %self.name,
                from = %previous.status,
                to = %next.status,
                "coordinator status changed"
            );
        }

        self.state_tx.send_replace(Arc::new(next));
        result
    }

    fn ingest(&mut self, snapshot: &Snapshot) {
        let keys: Vec<DimensionKey> = self.cache.keys().cloned().collect();
        for key in keys {
            match snapshot.dimension_value(&key) {
                Some(value) => {
                    self.cache.ingest(&key, value);
                }
                None => {
                    debug!(coordinator = %self.name, %key, "no value for smoothed key this cycle");
                }
            }
        }
    }
}

/// Builder for configuring a Coordinator.
pub struct CoordinatorBuilder {
    api: Arc<dyn NetdataApi>,
    name: Option<String>,
    interval: Option<Duration>,
    smoothed: Vec<DimensionKey>,
    window: usize,
}

impl CoordinatorBuilder {
    fn new(api: Arc<dyn NetdataApi>) -> Self {
        Self {
            api,
            name: None,
            interval: None,
            smoothed: Vec::new(),
            window: DEFAULT_WINDOW,
        }
    }

    /// Name used in log lines (default: the api's description).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the poll interval. Required.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Select keys whose readings are smoothed.
    pub fn smooth(mut self, keys: impl IntoIterator<Item = DimensionKey>) -> Self {
        self.smoothed.extend(keys);
        self
    }

    /// Set the smoothing window length (default: 3).
    pub fn window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Build the coordinator.
    pub fn build(self) -> Result<Coordinator, CoordinatorError> {
        let interval = self
            .interval
            .ok_or_else(|| CoordinatorError::Config("poll interval is required".to_string()))?;
        if interval.is_zero() {
            return Err(CoordinatorError::Config(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if self.window == 0 {
            return Err(CoordinatorError::Config(
                "smoothing window must hold at least one reading".to_string(),
            ));
        }

        let (state_tx, _) = watch::channel(Arc::new(CoordinatorState::idle()));

        Ok(Coordinator {
            name: self.name.unwrap_or_else(|| self.api.describe()),
            api: self.api,
            interval,
            cache: SmoothingCache::new(self.smoothed, self.window),
            state_tx,
        })
    }
}

/// Handle for a running coordinator.
///
/// Dropping the handle stops the poll loop, as does calling [`stop`](Self::stop).
#[derive(Debug)]
pub struct CoordinatorHandle {
    stop_tx: watch::Sender<bool>,
    refresh: Arc<Notify>,
    reader: StateReader,
    task: JoinHandle<()>,
}

impl CoordinatorHandle {
    /// The most recently published state.
    pub fn state(&self) -> Arc<CoordinatorState> {
        self.reader.current()
    }

    /// A reader for sensor views.
    pub fn subscribe(&self) -> StateReader {
        self.reader.clone()
    }

    /// Run a cycle as soon as the current one (if any) finishes.
    pub fn request_refresh(&self) {
        self.refresh.notify_one();
    }

    /// Stop the timer. No further fetches are issued.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Stop and wait for the poll loop to exit.
    pub async fn shutdown(self) {
        self.stop();
        let _ = self.task.await;
    }

    /// Whether the poll loop has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
