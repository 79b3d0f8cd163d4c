//! Plain-text sensor table printed in run mode.

use std::fmt::Write;

use crate::app::App;

const NAME_WIDTH: usize = 40;
const VALUE_WIDTH: usize = 14;

/// Render every host's sensors as a table.
pub fn render(app: &App) -> String {
    let mut out = String::new();

    for host in app.hosts() {
        let id = host.id();
        match app.state(&id) {
            Some(state) => {
                let _ = writeln!(
                    out,
                    "{} [{}] {} ({} cycles, {} failed)",
                    host.spec.name, id, state.status, state.cycles, state.failures
                );
                if let Some(err) = &state.last_error {
                    let _ = writeln!(out, "  last error: {}", err);
                }
            }
            None => {
                let _ = writeln!(out, "{} [{}] stopped", host.spec.name, id);
            }
        }

        for sensor in &host.sensors {
            let info = sensor.info();
            let _ = writeln!(
                out,
                "  {:<name$} {:>value$} {}",
                info.name,
                info.value.to_string(),
                info.unit.as_deref().unwrap_or(""),
                name = NAME_WIDTH,
                value = VALUE_WIDTH,
            );
        }
    }

    for failed in app.failed() {
        let _ = writeln!(
            out,
            "{} [{}] not running: {}",
            failed.name, failed.id, failed.error
        );
    }

    out
}
