//! Read-through sensor views over a coordinator's published state.
//!
//! Views hold no data of their own. Every read takes the latest published
//! state, so a view always reflects one complete cycle and never does I/O.

use std::fmt;

use netwatch_types::{AlarmSeverity, DimensionKey};

use crate::alarm::{aggregate_alarms, icon_for_severity};
use crate::error::ReadError;
use crate::registry::HostId;
use crate::state::StateReader;
use crate::units::{round_to, DeviceClass, Presentation};

/// One dimension of one series, exposed as a numeric sensor.
#[derive(Debug, Clone)]
pub struct NetdataSensor {
    key: DimensionKey,
    unique_id: String,
    name: String,
    reader: StateReader,
    presentation: Presentation,
}

impl NetdataSensor {
    /// Create a view for `key` on the host identified by `host`.
    ///
    /// Presentation is fixed from the series' units in the state published
    /// at creation time.
    pub fn new(host: &HostId, name: &str, key: DimensionKey, reader: StateReader) -> Self {
        let units = reader
            .current()
            .snapshot
            .as_ref()
            .and_then(|s| s.series(&key.series).map(|series| series.units.clone()));

        let presentation = match units {
            Some(units) => Presentation::lookup(&key.series, &key.dimension, &units),
            None => Presentation::unknown(&key.series, &key.dimension),
        };

        Self {
            unique_id: format!(
                "netdata-{}-{}-{}-{}",
                host.host, host.port, key.series, key.dimension
            ),
            name: format!("{} {} {}", name, key.series, key.dimension),
            key,
            reader,
            presentation,
        }
    }

    pub fn key(&self) -> &DimensionKey {
        &self.key
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> Option<&str> {
        self.presentation.unit.as_deref()
    }

    pub fn icon(&self) -> Option<&'static str> {
        self.presentation.icon
    }

    pub fn device_class(&self) -> Option<DeviceClass> {
        self.presentation.device_class
    }

    /// Whether the latest snapshot carries this sensor's series.
    pub fn available(&self) -> bool {
        self.reader
            .current()
            .snapshot
            .as_ref()
            .is_some_and(|s| s.series(&self.key.series).is_some())
    }

    /// The current reading in display units.
    ///
    /// Smoothed keys report the window mean once the window has data; other
    /// keys report the latest absolute value rounded to two decimals.
    pub fn try_value(&self) -> Result<f64, ReadError> {
        let state = self.reader.current();
        let snapshot = state.snapshot.as_ref().ok_or(ReadError::NoData)?;

        let series = snapshot
            .series(&self.key.series)
            .ok_or_else(|| ReadError::MissingSeries(self.key.series.clone()))?;

        let reading = match state.smoothed(&self.key) {
            Some(smoothed) => smoothed,
            None => {
                let raw = series.value(&self.key.dimension).ok_or_else(|| {
                    ReadError::MissingDimension {
                        series: self.key.series.clone(),
                        dimension: self.key.dimension.clone(),
                    }
                })?;
                round_to(raw.abs(), 2)
            }
        };

        Ok(self.presentation.convert(reading))
    }

    pub fn value(&self) -> Option<f64> {
        self.try_value().ok()
    }
}

/// The per-host alarm status sensor.
#[derive(Debug, Clone)]
pub struct AlarmSensor {
    unique_id: String,
    name: String,
    reader: StateReader,
}

impl AlarmSensor {
    pub fn new(host: &HostId, name: &str, reader: StateReader) -> Self {
        Self {
            unique_id: format!("netdata-alarm-{}-{}", host.host, host.port),
            name: format!("{} Alarms", name),
            reader,
        }
    }

    pub fn unique_id(&self) -> &str {
        &self.unique_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Aggregate severity, or `None` before any snapshot exists.
    pub fn value(&self) -> Option<AlarmSeverity> {
        self.reader
            .current()
            .snapshot
            .as_ref()
            .map(|s| aggregate_alarms(&s.alarms))
    }

    pub fn icon(&self) -> &'static str {
        icon_for_severity(self.value())
    }

    pub fn available(&self) -> bool {
        self.reader.current().snapshot.is_some()
    }
}

/// Reading reported by a sensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorValue {
    Number(f64),
    Severity(AlarmSeverity),
    Unavailable,
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorValue::Number(v) => write!(f, "{}", v),
            SensorValue::Severity(s) => write!(f, "{}", s),
            SensorValue::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// Point-in-time description of a sensor, as handed to the host platform.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorInfo {
    pub unique_id: String,
    pub name: String,
    pub unit: Option<String>,
    pub icon: Option<&'static str>,
    pub device_class: Option<DeviceClass>,
    pub value: SensorValue,
    pub available: bool,
}

/// Any sensor created for a host.
#[derive(Debug, Clone)]
pub enum Sensor {
    Metric(NetdataSensor),
    Alarm(AlarmSensor),
}

impl Sensor {
    pub fn unique_id(&self) -> &str {
        match self {
            Sensor::Metric(s) => s.unique_id(),
            Sensor::Alarm(s) => s.unique_id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Sensor::Metric(s) => s.name(),
            Sensor::Alarm(s) => s.name(),
        }
    }

    pub fn available(&self) -> bool {
        match self {
            Sensor::Metric(s) => s.available(),
            Sensor::Alarm(s) => s.available(),
        }
    }

    pub fn value(&self) -> SensorValue {
        let value = match self {
            Sensor::Metric(s) => s.value().map(SensorValue::Number),
            Sensor::Alarm(s) => s.value().map(SensorValue::Severity),
        };
        value.unwrap_or(SensorValue::Unavailable)
    }

    /// Describe the sensor as of the latest published state.
    pub fn info(&self) -> SensorInfo {
        match self {
            Sensor::Metric(s) => SensorInfo {
                unique_id: s.unique_id.clone(),
                name: s.name.clone(),
                unit: s.unit().map(str::to_string),
                icon: s.icon(),
                device_class: s.device_class(),
                value: self.value(),
                available: s.available(),
            },
            Sensor::Alarm(s) => SensorInfo {
                unique_id: s.unique_id.clone(),
                name: s.name.clone(),
                unit: None,
                icon: Some(s.icon()),
                device_class: None,
                value: self.value(),
                available: s.available(),
            },
        }
    }
}

impl From<NetdataSensor> for Sensor {
    fn from(sensor: NetdataSensor) -> Self {
        Sensor::Metric(sensor)
    }
}

impl From<AlarmSensor> for Sensor {
    fn from(sensor: AlarmSensor) -> Self {
        Sensor::Alarm(sensor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::CoordinatorState;
    use netwatch_types::{AlarmStatus, Snapshot};
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tokio::sync::watch;

    fn host() -> HostId {
        HostId::new("nas.local", 19999)
    }

    fn key(s: &str) -> DimensionKey {
        s.parse().unwrap()
    }

    fn published(
        snapshot: Option<Snapshot>,
        smoothed: &[(&str, f64)],
    ) -> (watch::Sender<Arc<CoordinatorState>>, StateReader) {
        let mut state = CoordinatorState::idle();
        state.snapshot = snapshot.map(Arc::new);
        state.smoothed = Arc::new(
            smoothed
                .iter()
                .map(|(k, v)| (key(k), *v))
                .collect::<BTreeMap<_, _>>(),
        );
        let (tx, rx) = watch::channel(Arc::new(state));
        (tx, StateReader::new(rx))
    }

    fn snapshot() -> Snapshot {
        Snapshot::builder()
            .series("net.eth0", "kilobits/s", |s| {
                s.dimension("received", 8192.0).dimension("sent", -2048.0)
            })
            .series("system.cpu", "percentage", |s| {
                s.dimension("user", -12.346).empty_dimension("steal")
            })
            .series("sensors.temp", "Celsius", |s| s.dimension("cpu", 51.0))
            .alarm("cpu_usage", AlarmStatus::Warning, "sysadmin")
            .build()
    }

    #[test]
    fn identity_follows_host_and_key() {
        let (_tx, reader) = published(Some(snapshot()), &[]);
        let sensor = NetdataSensor::new(&host(), "NAS", key("system.cpu/user"), reader);

        assert_eq!(sensor.unique_id(), "netdata-nas.local-19999-system.cpu-user");
        assert_eq!(sensor.name(), "NAS system.cpu user");
        assert_eq!(sensor.unit(), Some("%"));
    }

    #[test]
    fn raw_value_is_absolute_and_rounded() {
        let (_tx, reader) = published(Some(snapshot()), &[]);
        let sensor = NetdataSensor::new(&host(), "NAS", key("system.cpu/user"), reader);
        assert_eq!(sensor.try_value(), Ok(12.35));
    }

    #[test]
    fn kilobits_are_converted() {
        let (_tx, reader) = published(Some(snapshot()), &[]);
        let sensor = NetdataSensor::new(&host(), "NAS", key("net.eth0/received"), reader);
        assert_eq!(sensor.value(), Some(1.0));
        assert_eq!(sensor.unit(), Some("MB/s"));
        assert_eq!(sensor.icon(), Some("mdi:download"));
    }

    #[test]
    fn smoothed_value_wins_over_raw() {
        let (_tx, reader) = published(Some(snapshot()), &[("net.eth0/sent", 4096.0)]);
        let sensor = NetdataSensor::new(&host(), "NAS", key("net.eth0/sent"), reader);
        assert_eq!(sensor.value(), Some(0.5));
    }

    #[test]
    fn temperature_has_device_class() {
        let (_tx, reader) = published(Some(snapshot()), &[]);
        let sensor = NetdataSensor::new(&host(), "NAS", key("sensors.temp/cpu"), reader);
        assert_eq!(sensor.device_class(), Some(DeviceClass::Temperature));
        assert_eq!(sensor.icon(), None);
        assert_eq!(sensor.value(), Some(51.0));
    }

    #[test]
    fn missing_key_only_affects_its_own_sensor() {
        let (_tx, reader) = published(Some(snapshot()), &[]);
        let missing = NetdataSensor::new(&host(), "NAS", key("disk.sda/reads"), reader.clone());
        let present = NetdataSensor::new(&host(), "NAS", key("system.cpu/user"), reader);

        assert!(!missing.available());
        assert_eq!(
            missing.try_value(),
            Err(ReadError::MissingSeries("disk.sda".to_string()))
        );
        assert!(present.available());
        assert_eq!(present.value(), Some(12.35));
    }

    #[test]
    fn null_dimension_is_missing() {
        let (_tx, reader) = published(Some(snapshot()), &[]);
        let sensor = NetdataSensor::new(&host(), "NAS", key("system.cpu/steal"), reader);
        assert!(sensor.available());
        assert!(matches!(
            sensor.try_value(),
            Err(ReadError::MissingDimension { .. })
        ));
    }

    #[test]
    fn null_dimension_reports_smoothed_reading() {
        let (_tx, reader) = published(Some(snapshot()), &[("system.cpu/steal", 6.0)]);
        let sensor = NetdataSensor::new(&host(), "NAS", key("system.cpu/steal"), reader);
        assert!(sensor.available());
        assert_eq!(sensor.try_value(), Ok(6.0));
    }

    #[test]
    fn no_snapshot_means_no_data() {
        let (_tx, reader) = published(None, &[]);
        let sensor = NetdataSensor::new(&host(), "NAS", key("system.cpu/user"), reader.clone());
        assert_eq!(sensor.try_value(), Err(ReadError::NoData));
        assert_eq!(sensor.unit(), None);

        let alarm = AlarmSensor::new(&host(), "NAS", reader);
        assert_eq!(alarm.value(), None);
        assert_eq!(alarm.icon(), "mdi:crosshairs-question");
        assert!(!alarm.available());
    }

    #[test]
    fn views_follow_newly_published_state() {
        let (tx, reader) = published(Some(snapshot()), &[]);
        let sensor = NetdataSensor::new(&host(), "NAS", key("system.cpu/user"), reader.clone());
        let alarm = AlarmSensor::new(&host(), "NAS", reader);
        assert_eq!(alarm.value(), Some(AlarmSeverity::Warning));

        let mut next = CoordinatorState::idle();
        next.snapshot = Some(Arc::new(
            Snapshot::builder()
                .series("system.cpu", "percentage", |s| s.dimension("user", 3.0))
                .alarm("cpu_usage", AlarmStatus::Clear, "sysadmin")
                .build(),
        ));
        tx.send_replace(Arc::new(next));

        assert_eq!(sensor.value(), Some(3.0));
        assert_eq!(alarm.value(), Some(AlarmSeverity::Ok));
        assert_eq!(alarm.icon(), "mdi:check");
    }

    #[test]
    fn alarm_sensor_identity() {
        let (_tx, reader) = published(Some(snapshot()), &[]);
        let alarm = AlarmSensor::new(&host(), "NAS", reader);
        assert_eq!(alarm.unique_id(), "netdata-alarm-nas.local-19999");
        assert_eq!(alarm.name(), "NAS Alarms");
    }

    #[test]
    fn sensor_info_describes_both_kinds() {
        let (_tx, reader) = published(Some(snapshot()), &[]);
        let metric: Sensor =
            NetdataSensor::new(&host(), "NAS", key("system.cpu/user"), reader.clone()).into();
        let alarm: Sensor = AlarmSensor::new(&host(), "NAS", reader).into();

        let info = metric.info();
        assert_eq!(info.value, SensorValue::Number(12.35));
        assert_eq!(info.unit.as_deref(), Some("%"));
        assert!(info.available);

        let info = alarm.info();
        assert_eq!(info.value, SensorValue::Severity(AlarmSeverity::Warning));
        assert_eq!(info.icon, Some("mdi:alert-outline"));
        assert_eq!(info.value.to_string(), "warning");
    }
}
