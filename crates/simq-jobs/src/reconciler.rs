//! # Status Reconciler
//!
//! Merges the queue's live view with the persisted record into one
//! answer. While the queue holds the job, the queue wins; once the entry
//! is gone, the record is the only truth left.
//!
//! The first read that observes a terminal queue state also retrieves
//! the result (or error) and releases the queue entry, so queue
//! resources are reclaimed exactly once. Later reads fall back to the
//! record and never see the job as live again.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use simq_artifacts::{ArtifactStore, StatusUpdate, StoreError};
use simq_core::{JobId, Status, Timestamp};
use simq_queue::{JobQueue, QueueError};

use crate::error::JobError;

/// The reconciled view of one job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobState {
    /// The job id.
    pub id: JobId,
    /// Reconciled domain status.
    pub status: Status,
    /// When the queue first learned of the job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
    /// When the job entered the queue, while the queue still holds it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enqueued_at: Option<Timestamp>,
    /// When a worker claimed the job.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<Timestamp>,
    /// Result payload; present only on the first read that observes a
    /// successful terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    /// Error summary; present only on the first read that observes a
    /// failed terminal state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Reconciles queue state with the persisted record.
pub struct StatusReconciler {
    queue: Arc<dyn JobQueue>,
    store: Arc<dyn ArtifactStore>,
}

impl StatusReconciler {
    /// Create a reconciler over the given queue and store.
    pub fn new(queue: Arc<dyn JobQueue>, store: Arc<dyn ArtifactStore>) -> Self {
        Self { queue, store }
    }

    /// Fetch the reconciled status of a job.
    ///
    /// # Errors
    ///
    /// [`JobError::NotFound`] when neither the queue nor the artifact
    /// store knows the id.
    pub async fn fetch_status(&self, job_id: &JobId) -> Result<JobState, JobError> {
        if let Some(snapshot) = self.queue.fetch(job_id).await? {
            let status = Status::from_queue(snapshot.status);
            if !status.is_terminal() {
                return Ok(JobState {
                    id: job_id.clone(),
                    status,
                    created_at: Some(snapshot.created_at),
                    enqueued_at: Some(snapshot.enqueued_at),
                    started_at: snapshot.started_at,
                    result: None,
                    error: None,
                });
            }

            // First terminal read: take the outcome, then release the
            // queue entry. A racing read loses the entry and falls back
            // to the record below on its next call.
            let state = JobState {
                id: job_id.clone(),
                status,
                created_at: Some(snapshot.created_at),
                enqueued_at: Some(snapshot.enqueued_at),
                started_at: snapshot.started_at,
                result: snapshot.result,
                error: snapshot.error_info,
            };
            if let Err(e) = self.queue.cleanup(job_id, Duration::ZERO).await {
                tracing::warn!(job_id = %job_id, error = %e, "queue cleanup after terminal read failed");
            }
            return Ok(state);
        }

        // Queue no longer holds the job; the record is the answer.
        match self.store.get_simulation(job_id).await {
            Ok(record) => Ok(JobState {
                id: job_id.clone(),
                status: record.status,
                created_at: None,
                enqueued_at: None,
                started_at: record.start_time,
                result: None,
                error: None,
            }),
            Err(StoreError::NotFound(_)) => Err(JobError::NotFound(job_id.clone())),
            Err(other) => Err(other.into()),
        }
    }

    /// Cancel a job: flag the queue entry and settle the record as
    /// `cancelled`.
    ///
    /// # Errors
    ///
    /// [`JobError::NotFound`] when the queue no longer holds the job.
    pub async fn cancel(&self, job_id: &JobId) -> Result<JobState, JobError> {
        match self.queue.cancel(job_id).await {
            Ok(()) => {}
            Err(QueueError::NotFound(_)) => return Err(JobError::NotFound(job_id.clone())),
            Err(other) => return Err(other.into()),
        }
        self.store
            .update_status(job_id, StatusUpdate::to(Status::Cancelled).finished())
            .await?;

        // A started job keeps running until its next checkpoint, so the
        // queue may still report it live here.
        let snapshot = self.queue.fetch(job_id).await.ok().flatten();
        let status = snapshot
            .as_ref()
            .map(|s| Status::from_queue(s.status))
            .unwrap_or(Status::Cancelled);
        tracing::info!(job_id = %job_id, status = %status, "job cancelled");
        Ok(JobState {
            id: job_id.clone(),
            status,
            created_at: snapshot.as_ref().map(|s| s.created_at),
            enqueued_at: snapshot.as_ref().map(|s| s.enqueued_at),
            started_at: snapshot.and_then(|s| s.started_at),
            result: None,
            error: None,
        })
    }
}
