//! Alarm entries as reported by the netdata `alarms` endpoint.

use std::collections::BTreeMap;
use std::fmt;

/// Alarm entries keyed by alarm name.
pub type AlarmMap = BTreeMap<String, AlarmEntry>;

/// Status of a single netdata alarm.
///
/// Unknown status strings are preserved in [`AlarmStatus::Other`] so a newer
/// daemon never fails parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "String", into = "String")
)]
pub enum AlarmStatus {
    Clear,
    Warning,
    Critical,
    Undefined,
    Uninitialized,
    Other(String),
}

impl AlarmStatus {
    /// The wire representation of the status.
    pub fn as_str(&self) -> &str {
        match self {
            AlarmStatus::Clear => "CLEAR",
            AlarmStatus::Warning => "WARNING",
            AlarmStatus::Critical => "CRITICAL",
            AlarmStatus::Undefined => "UNDEFINED",
            AlarmStatus::Uninitialized => "UNINITIALIZED",
            AlarmStatus::Other(s) => s,
        }
    }
}

impl From<&str> for AlarmStatus {
    fn from(s: &str) -> Self {
        match s {
            "CLEAR" => AlarmStatus::Clear,
            "WARNING" => AlarmStatus::Warning,
            "CRITICAL" => AlarmStatus::Critical,
            "UNDEFINED" => AlarmStatus::Undefined,
            "UNINITIALIZED" => AlarmStatus::Uninitialized,
            other => AlarmStatus::Other(other.to_string()),
        }
    }
}

impl From<String> for AlarmStatus {
    fn from(s: String) -> Self {
        AlarmStatus::from(s.as_str())
    }
}

impl From<AlarmStatus> for String {
    fn from(status: AlarmStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for AlarmStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single alarm definition and its current state.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AlarmEntry {
    pub status: AlarmStatus,

    /// Notification recipient; `silent` means nobody is notified.
    #[cfg_attr(feature = "serde", serde(default))]
    pub recipient: String,
}

impl AlarmEntry {
    /// Create an alarm entry.
    pub fn new(status: AlarmStatus, recipient: impl Into<String>) -> Self {
        Self {
            status,
            recipient: recipient.into(),
        }
    }
}

/// Aggregate alarm severity for a host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum AlarmSeverity {
    Ok,
    Warning,
    Critical,
}

impl AlarmSeverity {
    /// Returns the state string exposed to the host platform.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmSeverity::Ok => "ok",
            AlarmSeverity::Warning => "warning",
            AlarmSeverity::Critical => "critical",
        }
    }
}

impl fmt::Display for AlarmSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
