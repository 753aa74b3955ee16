//! Error types for fetch collaborators.

use places::Provider;
use thiserror::Error;

/// Errors a fetch collaborator can report for one provider call.
///
/// The orchestrator never lets one of these abort a round: the failing
/// provider simply contributes no records.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The provider answered with an error or could not be reached
    #[error("{provider} fetch failed: {reason}")]
    Provider { provider: Provider, reason: String },

    /// A fixture file could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// A fixture file is not a JSON array of tagged records
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, FetchError>;
