//! Netdata client using the daemon's HTTP API (v1).
//!
//! The daemon normally listens on port 19999 and needs no authentication for
//! the read-only endpoints used here.
//!
//! ## Example
//!
//! ```rust,no_run
//! use netwatch_client::{NetdataApi, NetdataClient};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = NetdataClient::builder()
//!         .host("nas.local")
//!         .timeout(Duration::from_secs(5))
//!         .build()?;
//!
//!     for (id, series) in client.fetch_metrics().await? {
//!         println!("{} [{}]", id, series.units);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::parse::{parse_alarms, parse_metrics};
use crate::{AlarmMap, ClientError, MetricsMap, NetdataApi, ALARMS_PATH, ALLMETRICS_PATH};

/// Default netdata HTTP port.
pub const DEFAULT_PORT: u16 = 19999;

/// HTTP client for a single netdata daemon.
#[derive(Debug, Clone)]
pub struct NetdataClient {
    client: Client,
    endpoint: String,
}

impl NetdataClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> NetdataClientBuilder {
        NetdataClientBuilder::default()
    }

    /// Base URL of the daemon, without a trailing slash.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full URL of the all-metrics endpoint.
    pub fn allmetrics_url(&self) -> String {
        format!("{}{}", self.endpoint, ALLMETRICS_PATH)
    }

    /// Full URL of the alarms endpoint.
    pub fn alarms_url(&self) -> String {
        format!("{}{}", self.endpoint, ALARMS_PATH)
    }

    async fn get_body(&self, url: &str) -> Result<String, ClientError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::Http(format!(
                "API returned status {}",
                response.status()
            )));
        }

        let body = response.text().await?;
        debug!(url, bytes = body.len(), "fetched netdata resource");
        Ok(body)
    }
}

#[async_trait]
impl NetdataApi for NetdataClient {
    async fn fetch_metrics(&self) -> Result<MetricsMap, ClientError> {
        let body = self.get_body(&self.allmetrics_url()).await?;
        parse_metrics(&body)
    }

    async fn fetch_alarms(&self) -> Result<AlarmMap, ClientError> {
        let body = self.get_body(&self.alarms_url()).await?;
        parse_alarms(&body)
    }

    fn describe(&self) -> String {
        self.endpoint.clone()
    }
}

/// Builder for NetdataClient.
#[derive(Debug, Default)]
pub struct NetdataClientBuilder {
    host: Option<String>,
    port: Option<u16>,
    endpoint: Option<String>,
    timeout: Option<Duration>,
}

impl NetdataClientBuilder {
    /// Set the daemon host (default: "localhost").
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the daemon port (default: 19999).
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set a full base URL (e.g., "https://netdata.example.com").
    ///
    /// Takes precedence over `host` and `port`.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<NetdataClient, ClientError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        let endpoint = match self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!(
                "http://{}:{}",
                self.host.unwrap_or_else(|| "localhost".to_string()),
                self.port.unwrap_or(DEFAULT_PORT)
            ),
        };

        Ok(NetdataClient { client, endpoint })
    }
}
