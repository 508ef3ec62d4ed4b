//! # Artifact Store Contract
//!
//! The trait the orchestration layer programs against, injected as
//! `Arc<dyn ArtifactStore>`. [`StoreError::Registration`] is the one
//! error the Gatekeeper treats specially: it aborts a submission before
//! anything reaches the queue.

use async_trait::async_trait;
use simq_core::JobId;
use simq_interventions::InterventionPolicy;
use thiserror::Error;

use crate::record::{ModelConfiguration, SimulationRecord, StatusUpdate};

/// Error from an artifact-store operation.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store rejected the registration of a new simulation record.
    #[error("failed to register simulation {id} (store answered {status})")]
    Registration {
        /// The job whose registration failed.
        id: JobId,
        /// The store's HTTP-level answer.
        status: u16,
    },

    /// No simulation record with this id.
    #[error("simulation {0} not found in artifact store")]
    NotFound(JobId),

    /// No model configuration with this id.
    #[error("model configuration {0:?} not found in artifact store")]
    ModelConfigNotFound(String),

    /// No intervention policy with this id.
    #[error("intervention policy {0:?} not found in artifact store")]
    PolicyNotFound(String),

    /// The store could not be reached, or answered unintelligibly.
    #[error("artifact store transport failure: {0}")]
    Transport(String),
}

/// The artifact store: system of record for simulation runs and the
/// source of model configurations and intervention policies.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Register a new simulation record. Must succeed before the job is
    /// enqueued.
    async fn create_simulation(&self, record: &SimulationRecord) -> Result<(), StoreError>;

    /// Fetch a simulation record.
    async fn get_simulation(&self, id: &JobId) -> Result<SimulationRecord, StoreError>;

    /// Apply a status update to a simulation record.
    async fn update_status(&self, id: &JobId, update: StatusUpdate) -> Result<(), StoreError>;

    /// Fetch a model configuration by id.
    async fn model_configuration(&self, config_id: &str)
        -> Result<ModelConfiguration, StoreError>;

    /// Fetch an intervention policy by id.
    async fn intervention_policy(&self, policy_id: &str)
        -> Result<InterventionPolicy, StoreError>;
}
