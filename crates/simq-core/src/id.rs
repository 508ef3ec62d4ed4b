//! # Job Identifiers
//!
//! `JobId` is the engine-prefixed identifier shared by the queue, the
//! artifact store, and the HTTP surface. The format is `{engine}-{uuid}`,
//! so the execution engine that owns a job is recoverable from the
//! identifier alone.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// An engine-prefixed job identifier (`{engine}-{uuid}`).
///
/// # Construction
///
/// - [`JobId::generate()`] — a fresh id for the given engine (v4 UUID suffix).
/// - [`JobId::parse()`] — validate an externally supplied id.
///
/// The engine prefix must be non-empty ASCII alphanumeric (underscores
/// allowed); the suffix must be a valid UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId(String);

impl JobId {
    /// Generate a fresh job id for the given engine.
    pub fn generate(engine: &str) -> Result<Self, CoreError> {
        validate_engine(engine)?;
        Ok(Self(format!("{engine}-{}", Uuid::new_v4())))
    }

    /// Validate and wrap an externally supplied job id.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let (engine, suffix) = s.split_once('-').ok_or_else(|| CoreError::InvalidJobId {
            input: s.to_string(),
            reason: "expected {engine}-{uuid}".to_string(),
        })?;
        validate_engine(engine).map_err(|_| CoreError::InvalidJobId {
            input: s.to_string(),
            reason: "engine prefix must be non-empty ASCII alphanumeric".to_string(),
        })?;
        Uuid::parse_str(suffix).map_err(|e| CoreError::InvalidJobId {
            input: s.to_string(),
            reason: format!("uuid suffix: {e}"),
        })?;
        Ok(Self(s.to_string()))
    }

    /// The engine prefix of this id.
    pub fn engine(&self) -> &str {
        // Valid by construction; the fallback never fires.
        self.0.split_once('-').map(|(e, _)| e).unwrap_or(&self.0)
    }

    /// Return the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn validate_engine(engine: &str) -> Result<(), CoreError> {
    if engine.is_empty() {
        return Err(CoreError::InvalidEngine {
            input: engine.to_string(),
            reason: "must not be empty".to_string(),
        });
    }
    if !engine
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(CoreError::InvalidEngine {
            input: engine.to_string(),
            reason: "must be ASCII alphanumeric or underscore".to_string(),
        });
    }
    Ok(())
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for JobId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for JobId {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.0
    }
}
