//! Error types for the stream core.
//!
//! None of these are fatal to a viewing session. Page failures are logged and
//! swallowed by the pagination trigger; config failures fall back to defaults.

use thiserror::Error;

/// A page fetch that completed with a failure.
#[derive(Debug, Error)]
pub enum PageError {
    /// The comment store rejected the query.
    #[error("comment store error: {0}")]
    Store(#[from] tokio_rusqlite::Error),
    /// The loader went away before delivering a result.
    #[error("page loader disconnected")]
    Disconnected,
    /// Any other transport failure, carried as text.
    #[error("page fetch failed: {0}")]
    Fetch(String),
}

/// A page request the provider refused to start.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TriggerError {
    #[error("page loader is shut down")]
    LoaderClosed,
}

/// Failures while reading `config.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
