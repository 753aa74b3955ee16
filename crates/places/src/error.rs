//! Error types for the places crate.
//!
//! The `#[derive(Error)]` macro from thiserror implements `std::error::Error`
//! and `Display` from the `#[error(...)]` attributes, so each variant carries
//! just the context a caller needs to report or skip the offending input.

use thiserror::Error;

use crate::types::Provider;

/// Errors raised while building or validating domain values.
#[derive(Error, Debug)]
pub enum PlaceError {
    /// A raw provider record lacks data the canonical entity cannot do without
    /// (today: latitude or longitude).
    #[error("Malformed {provider} record '{source_id}': {reason}")]
    MalformedRecord {
        provider: Provider,
        source_id: String,
        reason: String,
    },

    /// A query carries values outside their documented domain
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// Converting a record to or from JSON failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, PlaceError>;
