//! Error types for the conformance runner
//!
//! Only faults of the harness itself end up here. A backend that misbehaves
//! produces failed test results, never an error.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConformanceError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to read config file {path}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error")]
    ConfigParse(#[from] toml::de::Error),

    #[error("HTTP client error")]
    Http(#[from] reqwest::Error),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

pub type ConformanceResult<T> = Result<T, ConformanceError>;
