//! Error types for the netdata client.

use thiserror::Error;

/// Errors that can occur when fetching from a netdata daemon.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// HTTP request failed or the daemon answered with a non-success status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Connection failed (refused, DNS failure, reset).
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The body was not JSON or did not have the expected shape.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The client could not be constructed.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Network-level failure: nothing usable came back from the daemon.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ClientError::Http(_) | ClientError::Connection(_) | ClientError::Timeout
        )
    }

    /// The daemon answered, but the body could not be understood.
    pub fn is_parse(&self) -> bool {
        matches!(self, ClientError::Parse(_))
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_and_parse_classification() {
        assert!(ClientError::Timeout.is_transport());
        assert!(ClientError::Connection("refused".into()).is_transport());
        assert!(ClientError::Http("503".into()).is_transport());
        assert!(!ClientError::Parse("eof".into()).is_transport());

        assert!(ClientError::Parse("eof".into()).is_parse());
        assert!(!ClientError::Config("bad".into()).is_parse());
        assert!(!ClientError::Config("bad".into()).is_transport());
    }

    #[test]
    fn serde_json_errors_become_parse_errors() {
        let err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        assert!(ClientError::from(err).is_parse());
    }
}
