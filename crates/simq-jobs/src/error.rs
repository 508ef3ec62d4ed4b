//! Orchestration-level error type, composing the collaborator errors.

use simq_artifacts::StoreError;
use simq_core::{CoreError, JobId};
use simq_interventions::ResolutionError;
use simq_queue::QueueError;
use thiserror::Error;

use crate::engine::EngineError;
use crate::requests::OperationKind;

/// Error from the orchestration layer.
#[derive(Error, Debug)]
pub enum JobError {
    /// Neither the queue nor the artifact store knows this job.
    #[error("job {0} not found")]
    NotFound(JobId),

    /// The operation name does not match any registered operation.
    #[error("unknown operation {0:?}")]
    UnknownOperation(String),

    /// A handler received a request of the wrong kind. Indicates a
    /// mis-wired registry, so it fails the job rather than degrading.
    #[error("handler for {expected} received a {actual} request")]
    OperationMismatch {
        /// The kind the handler is registered under.
        expected: OperationKind,
        /// The kind the request actually carries.
        actual: OperationKind,
    },

    /// The request carries an intervention policy but no model
    /// configuration to resolve it against.
    #[error("operation {0} carries a policy but no model configuration id")]
    MissingModelConfig(OperationKind),

    /// Artifact store failure.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Queue failure.
    #[error(transparent)]
    Queue(#[from] QueueError),

    /// Intervention resolution failure.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// Engine failure.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Core type validation failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Payload (de)serialization failure.
    #[error("payload serialization failed: {0}")]
    Payload(#[from] serde_json::Error),
}
