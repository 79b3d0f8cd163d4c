//! Error types for coordinators and sensor reads.

use netwatch_client::ClientError;
use thiserror::Error;

use crate::registry::HostId;

/// Errors raised while configuring or setting up a coordinator.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// Invalid builder input.
    #[error("invalid coordinator configuration: {0}")]
    Config(String),

    /// The very first poll failed, so there is no data to publish entities with.
    #[error("initial refresh of '{name}' failed: {source}")]
    Setup {
        name: String,
        #[source]
        source: ClientError,
    },

    /// A coordinator for this host is already running.
    #[error("a coordinator for {0} is already registered")]
    AlreadyRegistered(HostId),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Why a sensor has no value right now. Never fatal; only that sensor is affected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("no snapshot has been published yet")]
    NoData,

    #[error("series '{0}' is not present in the latest snapshot")]
    MissingSeries(String),

    #[error("dimension '{dimension}' of series '{series}' has no value")]
    MissingDimension { series: String, dimension: String },
}
