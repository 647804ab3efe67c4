//! Error types for the search pipeline.
//!
//! Nothing here is fatal to a session: a [`FetchError`] only ever removes one
//! source from the results, and a content failure is reported back as text.

use thiserror::Error;

/// Why a single page could not be fetched.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not complete within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Connection, TLS or body read failure
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with something other than 200
    #[error("unexpected status {0}")]
    Status(u16),

    /// The URL could not be parsed or built
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// The session was cancelled or ran past its deadline
    #[error("cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

impl From<url::ParseError> for FetchError {
    fn from(e: url::ParseError) -> Self {
        FetchError::InvalidUrl(e.to_string())
    }
}

/// Errors raised while loading the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("duplicate source name: {0}")]
    DuplicateSource(String),

    #[error("source with empty name")]
    EmptySourceName,
}

/// Errors raised at the session entry points.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Another search (or content fetch) is still outstanding
    #[error("a request is already in progress")]
    Busy,

    #[error("search query is empty")]
    EmptyQuery,

    #[error("no news source is enabled")]
    NoSources,

    #[error("failed to build http client: {0}")]
    Client(String),

    /// The background worker went away without reporting completion
    #[error("search worker stopped before completing")]
    WorkerGone,
}
