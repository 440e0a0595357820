//! Error types for the Meteotemplate uploader.

use std::time::Duration;
use thiserror::Error;

/// Errors raised while configuring the uploader or sending a record.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Missing or malformed configuration option
    #[error("Config error: {0}")]
    Config(String),

    /// Failed to parse configuration YAML
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration file not readable
    #[error("IO error: {0}")]
    Io(String),

    /// Connection refused, DNS failure or other transport problem
    #[error("Network error: {0}")]
    Network(String),

    /// No response within the configured bound
    #[error("Request timed out after {}s", .0.as_secs_f64())]
    Timeout(Duration),

    /// Server answered with a non-2xx status or an error body
    #[error("Rejected by server (status {status}): {message}")]
    Rejected { status: u16, message: String },
}

impl Error {
    /// Classify a transport error, separating timeouts from other failures.
    pub(crate) fn from_transport(err: reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            Error::Timeout(timeout)
        } else {
            Error::Network(err.to_string())
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Parse(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
