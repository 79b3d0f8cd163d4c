//! Configuration file loading and validation.
//!
//! Hosts are configured as an array of tables:
//!
//! ```toml
//! report_every_secs = 5
//!
//! [[hosts]]
//! name = "NAS"
//! host = "nas.local"
//! port = 19999
//! interval_secs = 1
//! resources = ["net.eth0/received", "system.cpu/user"]
//! filters = ["net.eth0/received"]
//! ```
//!
//! Top-level keys can be overridden from the environment with the
//! `NETWATCH__` prefix, e.g. `NETWATCH__REPORT_EVERY_SECS=10`.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, ensure, Context, Result};
use config::{Config, Environment, File, FileFormat};
use netwatch_core::{DimensionKey, HostSpec};
use serde::Deserialize;

fn default_name() -> String {
    "Netdata".to_string()
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    19999
}

fn default_window() -> usize {
    3
}

fn default_timeout() -> u64 {
    10
}

/// Top-level settings.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub hosts: Vec<HostConfig>,

    /// Minimum seconds between two printed reports.
    #[serde(default)]
    pub report_every_secs: Option<u64>,
}

/// One `[[hosts]]` table as written in the file.
#[derive(Debug, Clone, Deserialize)]
pub struct HostConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Poll interval; deliberately has no default.
    pub interval_secs: u64,
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(default)]
    pub filters: Vec<String>,
    #[serde(default = "default_window")]
    pub smoothing_window: usize,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Settings {
    /// Load settings from a file, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self> {
        Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix("NETWATCH").separator("__"))
            .build()
            .and_then(Config::try_deserialize)
            .with_context(|| format!("failed to load config from {}", path.display()))
    }

    /// Parse settings from TOML text, without environment overrides.
    pub fn from_toml(text: &str) -> Result<Self> {
        Config::builder()
            .add_source(File::from_str(text, FileFormat::Toml))
            .build()
            .and_then(Config::try_deserialize)
            .context("failed to parse config")
    }

    /// Validate every host and convert it for the coordinator.
    pub fn host_specs(&self) -> Result<Vec<HostSpec>> {
        ensure!(!self.hosts.is_empty(), "no hosts configured");

        let mut seen = BTreeSet::new();
        let mut specs = Vec::with_capacity(self.hosts.len());
        for host in &self.hosts {
            let spec = host
                .to_spec()
                .with_context(|| format!("invalid host {}:{}", host.host, host.port))?;
            if !seen.insert(spec.id()) {
                bail!("host {} is configured more than once", spec.id());
            }
            specs.push(spec);
        }
        Ok(specs)
    }
}

impl HostConfig {
    fn to_spec(&self) -> Result<HostSpec> {
        ensure!(self.interval_secs > 0, "interval_secs must be greater than zero");
        ensure!(
            self.smoothing_window > 0,
            "smoothing_window must be greater than zero"
        );

        let mut spec = HostSpec::new(
            self.name.clone(),
            self.host.clone(),
            self.port,
            Duration::from_secs(self.interval_secs),
        );
        spec.resources = parse_keys(&self.resources)?;
        spec.filters = parse_keys(&self.filters)?;
        spec.smoothing_window = self.smoothing_window;
        spec.timeout = Duration::from_secs(self.timeout_secs);
        Ok(spec)
    }
}

fn parse_keys(raw: &[String]) -> Result<Vec<DimensionKey>> {
    raw.iter()
        .map(|s| Ok(s.parse::<DimensionKey>()?))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"
report_every_secs = 5

[[hosts]]
name = "NAS"
host = "nas.local"
interval_secs = 2
resources = ["net.eth0/received", "system.cpu/user"]
filters = ["net.eth0/received"]

[[hosts]]
host = "router"
port = 20000
interval_secs = 1
"#;

    #[test]
    fn parses_hosts_with_defaults() {
        let settings = Settings::from_toml(SAMPLE).unwrap();
        assert_eq!(settings.report_every_secs, Some(5));

        let specs = settings.host_specs().unwrap();
        assert_eq!(specs.len(), 2);

        let nas = &specs[0];
        assert_eq!(nas.name, "NAS");
        assert_eq!(nas.port, 19999);
        assert_eq!(nas.interval, Duration::from_secs(2));
        assert_eq!(nas.resources.len(), 2);
        assert_eq!(nas.filters[0], DimensionKey::new("net.eth0", "received"));
        assert_eq!(nas.smoothing_window, 3);
        assert_eq!(nas.timeout, Duration::from_secs(10));

        let router = &specs[1];
        assert_eq!(router.name, "Netdata");
        assert_eq!(router.port, 20000);
        assert!(router.resources.is_empty());
    }

    #[test]
    fn interval_is_required() {
        let err = Settings::from_toml("[[hosts]]\nhost = \"nas\"\n").unwrap_err();
        assert!(format!("{:#}", err).contains("interval_secs"));
    }

    #[test]
    fn zero_interval_is_rejected() {
        let settings = Settings::from_toml("[[hosts]]\ninterval_secs = 0\n").unwrap();
        let err = settings.host_specs().unwrap_err();
        assert!(format!("{:#}", err).contains("interval_secs"));
    }

    #[test]
    fn zero_window_is_rejected() {
        let settings =
            Settings::from_toml("[[hosts]]\ninterval_secs = 1\nsmoothing_window = 0\n").unwrap();
        assert!(settings.host_specs().is_err());
    }

    #[test]
    fn malformed_key_is_rejected() {
        let settings =
            Settings::from_toml("[[hosts]]\ninterval_secs = 1\nresources = [\"no-slash\"]\n")
                .unwrap();
        let err = settings.host_specs().unwrap_err();
        assert!(format!("{:#}", err).contains("no-slash"));
    }

    #[test]
    fn duplicate_host_is_rejected() {
        let text = "[[hosts]]\ninterval_secs = 1\n\n[[hosts]]\ninterval_secs = 5\n";
        let err = Settings::from_toml(text).unwrap().host_specs().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn empty_config_has_no_hosts() {
        let settings = Settings::from_toml("").unwrap();
        assert!(settings.host_specs().is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.hosts.len(), 2);
        assert_eq!(settings.hosts[1].host, "router");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Settings::load(&dir.path().join("absent.toml")).is_err());
    }
}
