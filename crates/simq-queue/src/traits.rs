//! # Queue Contract Traits
//!
//! The seams between the orchestration layer and the queue backend. All
//! three traits are object safe and injected as `Arc<dyn _>`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use simq_core::{JobId, QueueStatus, Timestamp};
use thiserror::Error;

/// Error from a queue operation.
#[derive(Error, Debug)]
pub enum QueueError {
    /// The queue holds no job with this id.
    #[error("no job with id {0} in queue")]
    NotFound(JobId),

    /// The queue backend itself failed.
    #[error("queue backend failure: {0}")]
    Backend(String),
}

/// Executes the body of a job. Implemented by the worker layer and
/// injected into the queue at construction.
///
/// The payload is the opaque JSON the enqueuer supplied; the runner owns
/// its interpretation. Errors are returned as a rendered summary because
/// the queue stores them as the job's `error_info`.
#[async_trait]
pub trait JobRunner: Send + Sync {
    /// Run the job to completion, returning its result payload.
    async fn run(
        &self,
        job_id: &JobId,
        operation: &str,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, String>;
}

/// Invoked by the queue when a job's runner returns an error.
///
/// Attached per enqueue so different submission paths can react to
/// failure differently.
#[async_trait]
pub trait FailureHook: Send + Sync {
    /// React to the failure. `summary` is the runner's rendered error.
    async fn on_failure(&self, job_id: &JobId, summary: &str);
}

/// A request to enqueue one job.
pub struct EnqueueRequest {
    /// The job's identifier.
    pub job_id: JobId,
    /// Operation name, matched against the payload by the runner.
    pub operation: String,
    /// Opaque payload handed to the runner.
    pub payload: serde_json::Value,
    /// Hook invoked if the runner fails.
    pub on_failure: Option<Arc<dyn FailureHook>>,
}

/// A point-in-time view of a queued job.
#[derive(Debug, Clone)]
pub struct JobSnapshot {
    /// The job's identifier.
    pub id: JobId,
    /// Queue-native status at read time.
    pub status: QueueStatus,
    /// When the queue first learned of the job.
    pub created_at: Timestamp,
    /// When the job was enqueued.
    pub enqueued_at: Timestamp,
    /// When a worker claimed the job, if it has started.
    pub started_at: Option<Timestamp>,
    /// Result payload, present once the job finished successfully.
    pub result: Option<serde_json::Value>,
    /// Rendered error, present once the job failed.
    pub error_info: Option<String>,
}

/// The job queue contract.
///
/// `fetch` returns `Ok(None)` for unknown ids; the point operations
/// (`cancel`, `status`, `result`, `error_info`, `cleanup`) return
/// [`QueueError::NotFound`] instead, matching how callers use them.
#[async_trait]
pub trait JobQueue: Send + Sync {
    /// Register a job and hand it to a worker.
    async fn enqueue(&self, request: EnqueueRequest) -> Result<(), QueueError>;

    /// Fetch a snapshot of the job, or `None` if the queue no longer
    /// holds it.
    async fn fetch(&self, job_id: &JobId) -> Result<Option<JobSnapshot>, QueueError>;

    /// Flag the job as cancelled. A job not yet claimed will never run;
    /// a started job finishes its current invocation.
    async fn cancel(&self, job_id: &JobId) -> Result<(), QueueError>;

    /// Queue-native status of the job.
    async fn status(&self, job_id: &JobId) -> Result<QueueStatus, QueueError>;

    /// Result payload, if the job finished successfully.
    async fn result(&self, job_id: &JobId) -> Result<Option<serde_json::Value>, QueueError>;

    /// Rendered error, if the job failed.
    async fn error_info(&self, job_id: &JobId) -> Result<Option<String>, QueueError>;

    /// Release the job's queue resources. `ttl` is a grace period hint;
    /// `Duration::ZERO` means remove immediately.
    async fn cleanup(&self, job_id: &JobId, ttl: Duration) -> Result<(), QueueError>;
}
