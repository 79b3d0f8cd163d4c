//! Dimension keys - the unit of subscription for sensor views.

use std::fmt;
use std::str::FromStr;

/// Identifies one dimension of one series, written `series/dimension`.
///
/// Sensor views and the smoothing cache address data exclusively through
/// this pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct DimensionKey {
    /// Dotted series id, e.g. `net.eth0`.
    pub series: String,
    /// Dimension name within the series, e.g. `received`.
    pub dimension: String,
}

impl DimensionKey {
    /// Create a key from its parts.
    pub fn new(series: impl Into<String>, dimension: impl Into<String>) -> Self {
        Self {
            series: series.into(),
            dimension: dimension.into(),
        }
    }
}

impl fmt::Display for DimensionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.series, self.dimension)
    }
}

/// Error returned when a `series/dimension` string is malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyParseError {
    input: String,
}

impl fmt::Display for KeyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid dimension key '{}': expected 'series/dimension'",
            self.input
        )
    }
}

impl std::error::Error for KeyParseError {}

impl FromStr for DimensionKey {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Series ids never contain '/', dimension names occasionally do.
        match s.split_once('/') {
            Some((series, dimension)) if !series.is_empty() && !dimension.is_empty() => {
                Ok(Self::new(series, dimension))
            }
            _ => Err(KeyParseError {
                input: s.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for DimensionKey {
    type Error = KeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DimensionKey> for String {
    fn from(key: DimensionKey) -> Self {
        key.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_series_and_dimension() {
        let key: DimensionKey = "net.eth0/received".parse().unwrap();
        assert_eq!(key.series, "net.eth0");
        assert_eq!(key.dimension, "received");
        assert_eq!(key.to_string(), "net.eth0/received");
    }

    #[test]
    fn splits_on_first_slash_only() {
        let key: DimensionKey = "disk_space._/used/avail".parse().unwrap();
        assert_eq!(key.series, "disk_space._");
        assert_eq!(key.dimension, "used/avail");
    }

    #[test]
    fn rejects_malformed_keys() {
        assert!("net.eth0".parse::<DimensionKey>().is_err());
        assert!("/received".parse::<DimensionKey>().is_err());
        assert!("net.eth0/".parse::<DimensionKey>().is_err());
        assert!("".parse::<DimensionKey>().is_err());
    }

    #[test]
    fn parse_error_names_the_input() {
        let err = "bogus".parse::<DimensionKey>().unwrap_err();
        assert!(err.to_string().contains("'bogus'"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deserializes_from_string() {
        let keys: Vec<DimensionKey> =
            serde_json::from_str(r#"["system.cpu/user", "net.eth0/sent"]"#).unwrap();
        assert_eq!(keys[0], DimensionKey::new("system.cpu", "user"));
        assert_eq!(keys[1], DimensionKey::new("net.eth0", "sent"));

        assert!(serde_json::from_str::<DimensionKey>(r#""nodimension""#).is_err());
    }
}
