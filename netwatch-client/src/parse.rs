//! Parsing of netdata response bodies.

use serde::Deserialize;

use crate::{AlarmMap, ClientError, MetricsMap};

/// Top-level shape of the `alarms` endpoint response.
#[derive(Debug, Deserialize)]
struct AlarmsResponse {
    alarms: AlarmMap,
}

/// Parse an `allmetrics` body into series keyed by id.
///
/// Every series must carry `units` and `dimensions`; anything else in the
/// body is ignored.
pub fn parse_metrics(body: &str) -> Result<MetricsMap, ClientError> {
    Ok(serde_json::from_str(body)?)
}

/// Parse an `alarms` body into entries keyed by alarm name.
///
/// The body must be an object with an `alarms` key.
pub fn parse_alarms(body: &str) -> Result<AlarmMap, ClientError> {
    let response: AlarmsResponse = serde_json::from_str(body)?;
    Ok(response.alarms)
}
