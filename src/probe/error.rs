// src/probe/error.rs
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("invalid probe config: {0}")]
    Decode(#[from] serde_yaml::Error),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("expected code must be between 100 and 599, got {0}")]
    ExpectedCodeOutOfRange(u16),

    #[error("port is required and must be between 1 and 65535")]
    MissingPort,

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("expected code {expected}, got {actual}")]
    UnexpectedStatus { expected: u16, actual: u16 },

    #[error("connection to {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
}
