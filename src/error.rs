//! Error type shared by the fetch, extraction, and output modules.

use std::io;

use thiserror::Error;

/// Failures raised while building the corpus.
///
/// Per-item callers log these and move on to the next item; only setup
/// failures (configuration, unwritable root) reach `main`.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} answered HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("could not open PDF: {0}")]
    Pdf(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("{0}")]
    NotAvailable(String),
}

pub type CorpusResult<T> = Result<T, CorpusError>;
