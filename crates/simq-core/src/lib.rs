//! # simq-core — Foundational Types for the simq Service
//!
//! Defines the primitives every other crate in the workspace builds on:
//! job identifiers, the domain lifecycle state machine, the queue-native
//! status vocabulary and its mapping into the domain, and UTC timestamps.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `JobId` is a validated
//!    newtype, never a bare string. The engine prefix is recoverable from
//!    the identifier itself.
//!
//! 2. **Two status vocabularies, one mapping.** The queue backend reports
//!    its own fine-grained states (`QueueStatus`); callers only ever see
//!    the five-state domain `Status`. The mapping lives in exactly one
//!    place, `Status::from_queue`.
//!
//! 3. **UTC-only timestamps.** `Timestamp` is UTC with seconds precision,
//!    so record stamps serialize identically regardless of host timezone.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `simq-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod error;
pub mod id;
pub mod status;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::CoreError;
pub use id::JobId;
pub use status::{QueueStatus, Status};
pub use temporal::Timestamp;
