//! # simq-queue — Job Queue Adapter
//!
//! The queue contract the orchestration layer programs against, plus an
//! in-memory implementation backed by tokio tasks.
//!
//! ## Contract
//!
//! [`JobQueue`] exposes the seven operations the orchestrator needs:
//! enqueue, fetch, cancel, status, result, error_info, and cleanup.
//! Implementations are injected as `Arc<dyn JobQueue>`; nothing in the
//! workspace constructs a queue implicitly.
//!
//! ## Execution model
//!
//! [`InMemoryQueue`] spawns one tokio task per enqueued job. A job claims
//! its entry (moving it to `started`) before invoking the [`JobRunner`];
//! a cancel flag set before the claim prevents execution entirely.
//! Cancellation of a started job is cooperative: the running invocation
//! is never interrupted.

pub mod memory;
pub mod traits;

pub use memory::InMemoryQueue;
pub use traits::{EnqueueRequest, FailureHook, JobQueue, JobRunner, JobSnapshot, QueueError};
