use std::path::PathBuf;

use thiserror::Error;

/// Missing or malformed settings. Fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Scoreboard or challenge fetch failure. The cycle is skipped.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("error response (status {status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("API returned success=false")]
    Unsuccessful,
    #[error("error parsing JSON response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Push notification delivery failure. Logged, never retried.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("error response (status {status}): {body}")]
    Rejected { status: u16, body: String },
}

/// State cache write failure. In-memory state stays authoritative.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("error marshaling state: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("error writing {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
