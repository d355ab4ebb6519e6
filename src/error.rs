//! Error handling for the Kith core

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// Unified error type for the Kith core and its record store
#[derive(Error, Debug)]
pub enum Error {
    /// A referenced record is absent or soft-deleted
    #[error("not found: {0}")]
    NotFound(String),

    /// A timeline range whose start falls after its end
    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// A caller-supplied argument outside its accepted domain
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Input data rejected before any store call was made
    #[error("validation failed: {0}")]
    Validation(String),

    /// The store denied access to the requested rows
    #[error("access denied: {0}")]
    Forbidden(String),

    /// The store could not be reached
    #[error("store connection failed: {0}")]
    Connection(String),

    /// Any other failure reported by the backing store, passed through opaquely
    #[error("store error {code}: {message}")]
    Upstream { code: String, message: String },

    /// Network or HTTP related errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization or deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Any uncategorized failure
    #[error("{0}")]
    Unexpected(String),
}

impl Error {
    /// Create a new not-found error
    pub fn not_found<T: fmt::Display>(what: T) -> Self {
        Error::NotFound(what.to_string())
    }

    /// Create a new invalid-input error
    pub fn invalid_input<T: fmt::Display>(msg: T) -> Self {
        Error::InvalidInput(msg.to_string())
    }

    /// Create a new validation error
    pub fn validation<T: fmt::Display>(msg: T) -> Self {
        Error::Validation(msg.to_string())
    }

    /// Create a new uncategorized error
    pub fn unexpected<T: fmt::Display>(msg: T) -> Self {
        Error::Unexpected(msg.to_string())
    }

    /// Map a PostgREST/PostgreSQL error code onto the crate's error kinds.
    ///
    /// Codes the store is known to emit get a precise kind; everything else
    /// is passed through opaquely as [`Error::Upstream`].
    pub fn from_store_code(code: &str, message: &str) -> Self {
        match code {
            // PGRST116: no rows returned; 42P01: relation does not exist
            "PGRST116" | "42P01" => Error::NotFound(message.to_string()),
            // unique, foreign key and check constraint violations
            "23505" | "23503" | "23514" => Error::Validation(message.to_string()),
            // insufficient privilege (row level security)
            "42501" => Error::Forbidden(message.to_string()),
            // connection exception family
            "08000" | "08003" | "08006" => Error::Connection(message.to_string()),
            _ => Error::Upstream {
                code: code.to_string(),
                message: message.to_string(),
            },
        }
    }

    /// Whether this error was produced by input checks before any I/O
    pub fn is_validation_shaped(&self) -> bool {
        matches!(
            self,
            Error::InvalidRange { .. } | Error::InvalidInput(_) | Error::Validation(_)
        )
    }
}
