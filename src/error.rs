//! Error types shared by the fetchers, the enricher and the CLI.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Transport-level failure (connect, TLS, body read)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    /// A body that parsed but is not a recognisable answer
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A single upstream call exceeded the configured request timeout
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("feed error: {0}")]
    Feed(#[from] rss::Error),
}
