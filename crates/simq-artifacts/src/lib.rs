//! # simq-artifacts — Artifact Store Client
//!
//! The external artifact store is the system of record for simulation
//! runs: every submission registers a [`record::SimulationRecord`] there
//! before anything is enqueued, and workers push status transitions back
//! as execution proceeds.
//!
//! ## Layout
//!
//! - [`record`] — the simulation record and the status-update value object.
//! - [`store`] — the [`store::ArtifactStore`] trait and its error type.
//! - [`http`] — reqwest-backed implementation against the live store.
//! - [`memory`] — in-memory implementation for tests and standalone runs.
//! - [`progress`] — the progress sink seam; publish failures never fail
//!   a job.

pub mod http;
pub mod memory;
pub mod progress;
pub mod record;
pub mod store;

pub use http::{ArtifactStoreConfig, HttpArtifactStore};
pub use memory::InMemoryArtifactStore;
pub use progress::{BufferSink, LogSink, ProgressSink, ProgressUpdate, SinkError};
pub use record::{ModelConfiguration, SimulationRecord, StatusUpdate, SIMULATION_RECORD_TYPE};
pub use store::{ArtifactStore, StoreError};
