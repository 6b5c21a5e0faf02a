//! Error types for the episode categorizer.
//!
//! Variants display as their bare message: the handler forwards
//! `error.to_string()` to the caller verbatim, so a store failure reaches the
//! client exactly as the store reported it.

use thiserror::Error;

/// Result type alias using the categorizer's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for categorizer operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing request input. Always client-caused.
    #[error("{0}")]
    Validation(String),

    /// Any record store failure: not found, multiple match, transport,
    /// authorization.
    #[error("{0}")]
    Store(String),

    /// Label computation failed.
    #[error("{0}")]
    Categorization(String),

    /// Startup configuration problem.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Short machine-readable kind, used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::Store(_) => "store",
            Error::Categorization(_) => "categorization",
            Error::Config(_) => "config",
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::Store(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Store(e.to_string())
    }
}
