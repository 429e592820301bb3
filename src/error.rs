use std::time::Duration;

use thiserror::Error;

/// Top-level error type for ntpwatch.
#[derive(Error, Debug)]
pub enum WatchError {
    /// DNS resolution failure.
    #[error("dns: {0}")]
    Dns(String),
    /// Network related error.
    #[error("network: {0}")]
    Network(String),
    /// Protocol violation.
    #[error("protocol: {0}")]
    Protocol(String),
    /// Probe did not answer in time.
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    /// Alert could not be delivered.
    #[error("notify: {0}")]
    Notify(String),
    /// Invalid startup configuration.
    #[error("config: {0}")]
    Config(String),
    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Other error cases.
    #[error("other: {0}")]
    Other(String),
}

impl From<rsntp::SynchronizationError> for WatchError {
    fn from(err: rsntp::SynchronizationError) -> Self {
        match err {
            rsntp::SynchronizationError::IOError(e) => WatchError::Network(e.to_string()),
            rsntp::SynchronizationError::ProtocolError(e) => WatchError::Protocol(e.to_string()),
        }
    }
}

impl From<reqwest::Error> for WatchError {
    fn from(err: reqwest::Error) -> Self {
        WatchError::Notify(err.to_string())
    }
}
