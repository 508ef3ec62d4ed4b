//! # Job Lifecycle Statuses
//!
//! Two vocabularies live here:
//!
//! - [`Status`] — the five-state domain lifecycle every caller sees:
//!   `queued → running → {complete, error}`, with `cancelled` reachable
//!   from either non-terminal state. Terminal states are immutable.
//! - [`QueueStatus`] — the queue backend's finer-grained native states.
//!
//! The only bridge between them is [`Status::from_queue`]. Keeping the
//! mapping in one exhaustive `match` means adding a queue state forces a
//! decision about its domain meaning.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Domain-visible job lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Accepted and registered; not yet picked up by a worker.
    Queued,
    /// A worker is executing the job.
    Running,
    /// Terminal: finished successfully, result available.
    Complete,
    /// Terminal: execution failed.
    Error,
    /// Terminal: cancelled before or during execution.
    Cancelled,
}

impl Status {
    /// Whether this status is terminal (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Error | Self::Cancelled)
    }

    /// Map a queue-native status into the domain lifecycle.
    ///
    /// Pre-execution states (queued, deferred, scheduled) all read as
    /// `queued`; the caller never distinguishes them.
    pub fn from_queue(status: QueueStatus) -> Self {
        match status {
            QueueStatus::Started => Self::Running,
            QueueStatus::Finished => Self::Complete,
            QueueStatus::Failed => Self::Error,
            QueueStatus::Stopped | QueueStatus::Canceled => Self::Cancelled,
            QueueStatus::Queued | QueueStatus::Deferred | QueueStatus::Scheduled => Self::Queued,
        }
    }

    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Error => "error",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "queued" => Ok(Self::Queued),
            "running" => Ok(Self::Running),
            "complete" => Ok(Self::Complete),
            "error" => Ok(Self::Error),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }
}

/// Queue-native job status, as reported by the queue backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueStatus {
    /// Enqueued, waiting for a worker.
    Queued,
    /// Waiting on a dependency.
    Deferred,
    /// Scheduled for a future time.
    Scheduled,
    /// Claimed by a worker, executing.
    Started,
    /// Execution finished successfully.
    Finished,
    /// Execution raised an error.
    Failed,
    /// Stopped by an operator.
    Stopped,
    /// Cancelled before completion.
    Canceled,
}

impl QueueStatus {
    /// Whether the queue considers this job done (success or failure).
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            Self::Finished | Self::Failed | Self::Stopped | Self::Canceled
        )
    }

    /// Return the string representation of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queued => "queued",
            Self::Deferred => "deferred",
            Self::Scheduled => "scheduled",
            Self::Started => "started",
            Self::Finished => "finished",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── domain status ──

    #[test]
    fn test_terminal_states() {
        assert!(!Status::Queued.is_terminal());
        assert!(!Status::Running.is_terminal());
        assert!(Status::Complete.is_terminal());
        assert!(Status::Error.is_terminal());
        assert!(Status::Cancelled.is_terminal());
    }

    #[test]
    fn test_status_as_str_roundtrip() {
        for status in [
            Status::Queued,
            Status::Running,
            Status::Complete,
            Status::Error,
            Status::Cancelled,
        ] {
            let parsed: Status = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_status_from_str_rejects_unknown() {
        assert!("finished".parse::<Status>().is_err());
        assert!("".parse::<Status>().is_err());
    }

    #[test]
    fn test_status_serde_snake_case() {
        assert_eq!(serde_json::to_string(&Status::Complete).unwrap(), "\"complete\"");
        let parsed: Status = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(parsed, Status::Cancelled);
    }

    // ── queue → domain mapping ──

    #[test]
    fn test_started_maps_to_running() {
        assert_eq!(Status::from_queue(QueueStatus::Started), Status::Running);
    }

    #[test]
    fn test_finished_maps_to_complete() {
        assert_eq!(Status::from_queue(QueueStatus::Finished), Status::Complete);
    }

    #[test]
    fn test_failed_maps_to_error() {
        assert_eq!(Status::from_queue(QueueStatus::Failed), Status::Error);
    }

    #[test]
    fn test_stopped_and_canceled_map_to_cancelled() {
        assert_eq!(Status::from_queue(QueueStatus::Stopped), Status::Cancelled);
        assert_eq!(Status::from_queue(QueueStatus::Canceled), Status::Cancelled);
    }

    #[test]
    fn test_pre_execution_states_map_to_queued() {
        assert_eq!(Status::from_queue(QueueStatus::Queued), Status::Queued);
        assert_eq!(Status::from_queue(QueueStatus::Deferred), Status::Queued);
        assert_eq!(Status::from_queue(QueueStatus::Scheduled), Status::Queued);
    }

    // ── queue status ──

    #[test]
    fn test_queue_settled() {
        assert!(QueueStatus::Finished.is_settled());
        assert!(QueueStatus::Failed.is_settled());
        assert!(QueueStatus::Stopped.is_settled());
        assert!(QueueStatus::Canceled.is_settled());
        assert!(!QueueStatus::Queued.is_settled());
        assert!(!QueueStatus::Started.is_settled());
        assert!(!QueueStatus::Deferred.is_settled());
        assert!(!QueueStatus::Scheduled.is_settled());
    }

    #[test]
    fn test_queue_status_display() {
        assert_eq!(QueueStatus::Canceled.to_string(), "canceled");
        assert_eq!(QueueStatus::Started.to_string(), "started");
    }
}
