//! # simq-jobs — Job Orchestration
//!
//! The orchestration layer between the HTTP surface and the two external
//! collaborators (queue, artifact store):
//!
//! - [`gatekeeper::Gatekeeper`] — accepts a typed operation request,
//!   registers the simulation record, and enqueues the job. Registration
//!   failure aborts before anything reaches the queue.
//! - [`reconciler::StatusReconciler`] — merges the queue's live view
//!   with the persisted record into one domain status, retrieving the
//!   result exactly once at the first terminal read.
//! - [`registry::OperationRegistry`] — the closed mapping from operation
//!   kind to the handler that builds an engine invocation. There is no
//!   dynamic dispatch by name lookup in arbitrary scope; an operation
//!   either has a registered handler or the job fails up front.
//! - [`worker`] — the execution path a queue worker runs: mark running,
//!   resolve interventions, build the invocation, call the engine, mark
//!   complete. Failures surface through the queue's failure hook as a
//!   terminal `error` record.
//!
//! All collaborators are trait objects injected at construction; nothing
//! here reaches for globals.

pub mod engine;
pub mod error;
pub mod gatekeeper;
pub mod reconciler;
pub mod registry;
pub mod requests;
pub mod worker;

pub use engine::{EngineError, EngineInvocation, SimulationEngine, SimulationOutput, StubEngine};
pub use error::JobError;
pub use gatekeeper::{Gatekeeper, SubmitOptions, SubmitReceipt, DEFAULT_ENGINE, POLL_INTERVAL};
pub use reconciler::{JobState, StatusReconciler};
pub use registry::OperationRegistry;
pub use requests::{
    CalibrateRequest, Dataset, EnsembleCalibrateRequest, EnsembleModelConfig,
    EnsembleSimulateRequest, OperationKind, OperationRequest, OptimizeRequest, SimulateRequest,
    Timespan,
};
pub use worker::{OperationRunner, RecordFailureHook, WorkerContext};
