//! JSON export of every sensor's current state.

use std::io::Write;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde_json::{json, Value};

use netwatch_core::{SensorInfo, SensorValue};

use crate::app::App;

fn sensor_json(info: &SensorInfo) -> Value {
    let value = match info.value {
        SensorValue::Number(v) => json!(v),
        SensorValue::Severity(s) => json!(s.as_str()),
        SensorValue::Unavailable => Value::Null,
    };

    json!({
        "unique_id": info.unique_id,
        "name": info.name,
        "unit": info.unit,
        "icon": info.icon,
        "device_class": info.device_class.map(|d| d.as_str()),
        "value": value,
        "available": info.available,
    })
}

/// Build the export document.
pub fn document(app: &App) -> Value {
    let generated_at_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let hosts: Vec<Value> = app
        .hosts()
        .iter()
        .map(|host| {
            let id = host.id();
            let state = app.state(&id);
            json!({
                "id": id.to_string(),
                "name": host.spec.name,
                "status": state.as_ref().map(|s| s.status.as_str()),
                "cycles": state.as_ref().map(|s| s.cycles),
                "failures": state.as_ref().map(|s| s.failures),
                "last_error": state
                    .as_ref()
                    .and_then(|s| s.last_error.as_ref())
                    .map(|e| e.to_string()),
                "sensors": host
                    .sensors
                    .iter()
                    .map(|s| sensor_json(&s.info()))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    let failed: Vec<Value> = app
        .failed()
        .iter()
        .map(|f| {
            json!({
                "id": f.id.to_string(),
                "name": f.name,
                "error": f.error,
            })
        })
        .collect();

    json!({
        "generated_at_ms": generated_at_ms,
        "hosts": hosts,
        "failed": failed,
    })
}

/// Write the export document to `path`.
pub fn export_to_file(app: &App, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&document(app))?;
    let mut file = std::fs::File::create(path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    file.write_all(json.as_bytes())?;
    Ok(())
}
