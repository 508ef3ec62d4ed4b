//! # Error Types — Core Validation Failures
//!
//! Errors raised while constructing or parsing the foundational types.
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations and carry the offending input for diagnostics.

use thiserror::Error;

/// Validation error for the core primitive types.
#[derive(Error, Debug)]
pub enum CoreError {
    /// A job identifier failed validation.
    #[error("invalid job id {input:?}: {reason}")]
    InvalidJobId {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An engine name failed validation.
    #[error("invalid engine name {input:?}: {reason}")]
    InvalidEngine {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A status string did not match any known variant.
    #[error("unknown status {0:?}")]
    UnknownStatus(String),

    /// A timestamp string could not be parsed.
    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },
}
