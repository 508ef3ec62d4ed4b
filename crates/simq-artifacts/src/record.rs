//! # Simulation Records
//!
//! The persisted representation of a job in the artifact store, plus the
//! [`StatusUpdate`] value object both store implementations apply through
//! [`SimulationRecord::apply`]. Keeping the mutation in one place means
//! the HTTP read-modify-write path and the in-memory path cannot drift.

use serde::{Deserialize, Serialize};
use simq_core::{JobId, Status, Timestamp};
use simq_interventions::ModelConfigMap;

/// The `type` field every simulation record carries.
pub const SIMULATION_RECORD_TYPE: &str = "simulation";

/// A simulation run as persisted in the artifact store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    /// The job id, shared with the queue.
    pub id: JobId,
    /// The raw operation request, as submitted.
    pub execution_payload: serde_json::Value,
    /// Files produced by the engine, filled in on completion.
    #[serde(default)]
    pub result_files: Vec<String>,
    /// Record discriminator, always [`SIMULATION_RECORD_TYPE`].
    #[serde(rename = "type")]
    pub record_type: String,
    /// Current lifecycle status.
    pub status: Status,
    /// The engine the job targets.
    pub engine: String,
    /// Owning workflow, when the caller supplied one.
    #[serde(default)]
    pub workflow_id: Option<String>,
    /// Stamped when a worker claims the job.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<Timestamp>,
    /// Stamped when the job reaches a terminal status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_time: Option<Timestamp>,
}

impl SimulationRecord {
    /// Build the record registered at submission time. The job doubles as
    /// its own workflow until a caller groups it into a larger one.
    pub fn queued(id: JobId, engine: impl Into<String>, payload: serde_json::Value) -> Self {
        let workflow_id = Some(id.as_str().to_string());
        Self {
            id,
            execution_payload: payload,
            result_files: Vec::new(),
            record_type: SIMULATION_RECORD_TYPE.to_string(),
            status: Status::Queued,
            engine: engine.into(),
            workflow_id,
            start_time: None,
            completed_time: None,
        }
    }

    /// Apply a status update to this record in place.
    pub fn apply(&mut self, update: &StatusUpdate) {
        self.status = update.status;
        if !update.result_files.is_empty() {
            self.result_files = update.result_files.clone();
        }
        if update.mark_started && self.start_time.is_none() {
            self.start_time = Some(Timestamp::now());
        }
        if update.mark_finished {
            self.completed_time = Some(Timestamp::now());
        }
    }
}

/// A status transition to push to the artifact store.
///
/// Built with the fluent constructors, e.g.
/// `StatusUpdate::to(Status::Running).started()`.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    /// The status to write.
    pub status: Status,
    /// Result files to attach (replaces the record's list when non-empty).
    pub result_files: Vec<String>,
    /// Stamp `start_time` if not already set.
    pub mark_started: bool,
    /// Stamp `completed_time`.
    pub mark_finished: bool,
}

impl StatusUpdate {
    /// A plain transition to the given status.
    pub fn to(status: Status) -> Self {
        Self {
            status,
            result_files: Vec::new(),
            mark_started: false,
            mark_finished: false,
        }
    }

    /// Also stamp `start_time`.
    pub fn started(mut self) -> Self {
        self.mark_started = true;
        self
    }

    /// Also stamp `completed_time`.
    pub fn finished(mut self) -> Self {
        self.mark_finished = true;
        self
    }

    /// Attach result files.
    pub fn with_result_files(mut self, files: Vec<String>) -> Self {
        self.result_files = files;
        self
    }
}

/// The slice of a model configuration the worker needs: its id and the
/// target → semantic map used for intervention resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelConfiguration {
    /// Configuration id in the artifact store.
    pub id: String,
    /// Target semantics (parameters and initial states).
    #[serde(default)]
    pub semantics: ModelConfigMap,
}
