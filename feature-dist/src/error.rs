use std::time::Duration;

use thiserror::Error;

/// Why a histogram fetch did not produce data.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FetchError {
    #[error("connect to {addr}: {reason}")]
    Connect { addr: String, reason: String },

    #[error("io: {0}")]
    Io(String),

    #[error("dataset API returned HTTP {code}: {body}")]
    Status { code: u16, body: String },

    #[error("malformed histogram response: {0}")]
    Parse(String),

    #[error("no response after {0:?}")]
    Timeout(Duration),
}

impl From<std::io::Error> for FetchError {
    fn from(e: std::io::Error) -> Self {
        FetchError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Parse(e.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var}: expected {expected}, got '{value}'")]
    Invalid {
        var: &'static str,
        expected: &'static str,
        value: String,
    },
}
