//! Reduction of a host's alarm set to a single severity.

use netwatch_types::{AlarmEntry, AlarmMap, AlarmSeverity, AlarmStatus};

/// Recipient whose alarms never count towards the aggregate.
pub const SILENT_RECIPIENT: &str = "silent";

/// Icon shown for an aggregate severity, or for the no-data state.
pub fn icon_for_severity(severity: Option<AlarmSeverity>) -> &'static str {
    match severity {
        Some(AlarmSeverity::Ok) => "mdi:check",
        Some(AlarmSeverity::Warning) => "mdi:alert-outline",
        Some(AlarmSeverity::Critical) => "mdi:alert",
        None => "mdi:crosshairs-question",
    }
}

/// Whether an alarm affects the aggregate severity.
pub fn is_relevant(entry: &AlarmEntry) -> bool {
    if entry.recipient == SILENT_RECIPIENT {
        return false;
    }
    !matches!(
        entry.status,
        AlarmStatus::Clear | AlarmStatus::Undefined | AlarmStatus::Uninitialized
    )
}

/// Reduce an alarm set to `ok`, `warning` or `critical`.
///
/// Any relevant critical alarm makes the result critical. Otherwise any
/// relevant alarm at all, whatever its status, makes it a warning.
pub fn aggregate_alarms(alarms: &AlarmMap) -> AlarmSeverity {
    let mut any = false;

    for entry in alarms.values().filter(|entry| is_relevant(entry)) {
        if entry.status == AlarmStatus::Critical {
            return AlarmSeverity::Critical;
        }
        any = true;
    }

    if any {
        AlarmSeverity::Warning
    } else {
        AlarmSeverity::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alarms(entries: &[(&str, AlarmStatus, &str)]) -> AlarmMap {
        entries
            .iter()
            .map(|(name, status, recipient)| {
                (name.to_string(), AlarmEntry::new(status.clone(), *recipient))
            })
            .collect()
    }

    #[test]
    fn critical_wins_over_clear() {
        let set = alarms(&[
            ("a", AlarmStatus::Critical, "sysadmin"),
            ("b", AlarmStatus::Clear, "sysadmin"),
        ]);
        assert_eq!(aggregate_alarms(&set), AlarmSeverity::Critical);
    }

    #[test]
    fn single_warning_is_warning() {
        let set = alarms(&[("a", AlarmStatus::Warning, "sysadmin")]);
        assert_eq!(aggregate_alarms(&set), AlarmSeverity::Warning);
    }

    #[test]
    fn silent_recipient_is_ignored() {
        let set = alarms(&[("a", AlarmStatus::Warning, "silent")]);
        assert_eq!(aggregate_alarms(&set), AlarmSeverity::Ok);

        let set = alarms(&[("a", AlarmStatus::Critical, "silent")]);
        assert_eq!(aggregate_alarms(&set), AlarmSeverity::Ok);
    }

    #[test]
    fn empty_set_is_ok() {
        assert_eq!(aggregate_alarms(&AlarmMap::new()), AlarmSeverity::Ok);
    }

    #[test]
    fn inactive_statuses_are_irrelevant() {
        let set = alarms(&[
            ("a", AlarmStatus::Clear, "sysadmin"),
            ("b", AlarmStatus::Undefined, "sysadmin"),
            ("c", AlarmStatus::Uninitialized, "sysadmin"),
        ]);
        assert_eq!(aggregate_alarms(&set), AlarmSeverity::Ok);
    }

    #[test]
    fn unknown_status_counts_as_warning() {
        let set = alarms(&[("a", AlarmStatus::Other("REMOVED".into()), "sysadmin")]);
        assert_eq!(aggregate_alarms(&set), AlarmSeverity::Warning);
    }

    #[test]
    fn critical_found_among_many() {
        let set = alarms(&[
            ("a", AlarmStatus::Warning, "sysadmin"),
            ("b", AlarmStatus::Warning, "silent"),
            ("z", AlarmStatus::Critical, "sysadmin"),
        ]);
        assert_eq!(aggregate_alarms(&set), AlarmSeverity::Critical);
    }

    #[test]
    fn severity_icons() {
        assert_eq!(icon_for_severity(Some(AlarmSeverity::Ok)), "mdi:check");
        assert_eq!(icon_for_severity(Some(AlarmSeverity::Critical)), "mdi:alert");
        assert_eq!(icon_for_severity(None), "mdi:crosshairs-question");
    }
}
