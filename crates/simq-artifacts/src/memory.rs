//! # In-Memory Artifact Store
//!
//! Backing store for tests and standalone runs. Shares the update
//! semantics of the HTTP client through [`SimulationRecord::apply`].
//! Creates can be toggled to fail, for exercising the registration-abort
//! path without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use simq_core::JobId;
use simq_interventions::InterventionPolicy;

use crate::record::{ModelConfiguration, SimulationRecord, StatusUpdate};
use crate::store::{ArtifactStore, StoreError};

/// In-memory [`ArtifactStore`] implementation.
#[derive(Default)]
pub struct InMemoryArtifactStore {
    simulations: RwLock<HashMap<JobId, SimulationRecord>>,
    model_configs: RwLock<HashMap<String, ModelConfiguration>>,
    policies: RwLock<HashMap<String, InterventionPolicy>>,
    reject_creates: AtomicBool,
}

impl InMemoryArtifactStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a model configuration.
    pub fn insert_model_configuration(&self, config: ModelConfiguration) {
        self.model_configs.write().insert(config.id.clone(), config);
    }

    /// Seed an intervention policy under the given id.
    pub fn insert_policy(&self, policy_id: impl Into<String>, policy: InterventionPolicy) {
        self.policies.write().insert(policy_id.into(), policy);
    }

    /// Make subsequent `create_simulation` calls fail with a
    /// registration error, simulating a store outage.
    pub fn set_reject_creates(&self, reject: bool) {
        self.reject_creates.store(reject, Ordering::SeqCst);
    }

    /// Number of simulation records held.
    pub fn simulation_count(&self) -> usize {
        self.simulations.read().len()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn create_simulation(&self, record: &SimulationRecord) -> Result<(), StoreError> {
        if self.reject_creates.load(Ordering::SeqCst) {
            return Err(StoreError::Registration {
                id: record.id.clone(),
                status: 503,
            });
        }
        self.simulations
            .write()
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get_simulation(&self, id: &JobId) -> Result<SimulationRecord, StoreError> {
        self.simulations
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn update_status(&self, id: &JobId, update: StatusUpdate) -> Result<(), StoreError> {
        let mut guard = self.simulations.write();
        let record = guard
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;
        record.apply(&update);
        Ok(())
    }

    async fn model_configuration(
        &self,
        config_id: &str,
    ) -> Result<ModelConfiguration, StoreError> {
        self.model_configs
            .read()
            .get(config_id)
            .cloned()
            .ok_or_else(|| StoreError::ModelConfigNotFound(config_id.to_string()))
    }

    async fn intervention_policy(
        &self,
        policy_id: &str,
    ) -> Result<InterventionPolicy, StoreError> {
        self.policies
            .read()
            .get(policy_id)
            .cloned()
            .ok_or_else(|| StoreError::PolicyNotFound(policy_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simq_core::Status;

    fn record(id: &JobId) -> SimulationRecord {
        SimulationRecord::queued(id.clone(), "ciemss", serde_json::json!({}))
    }

    #[tokio::test]
    async fn test_create_and_get_roundtrip() {
        let store = InMemoryArtifactStore::new();
        let id = JobId::generate("ciemss").unwrap();
        store.create_simulation(&record(&id)).await.unwrap();

        let fetched = store.get_simulation(&id).await.unwrap();
        assert_eq!(fetched.id, id);
        assert_eq!(fetched.status, Status::Queued);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = InMemoryArtifactStore::new();
        let id = JobId::generate("ciemss").unwrap();
        assert!(matches!(
            store.get_simulation(&id).await,
            Err(StoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_status_applies() {
        let store = InMemoryArtifactStore::new();
        let id = JobId::generate("ciemss").unwrap();
        store.create_simulation(&record(&id)).await.unwrap();

        store
            .update_status(&id, StatusUpdate::to(Status::Running).started())
            .await
            .unwrap();
        let fetched = store.get_simulation(&id).await.unwrap();
        assert_eq!(fetched.status, Status::Running);
        assert!(fetched.start_time.is_some());
    }

    #[tokio::test]
    async fn test_reject_creates_yields_registration_error() {
        let store = InMemoryArtifactStore::new();
        store.set_reject_creates(true);
        let id = JobId::generate("ciemss").unwrap();
        let err = store.create_simulation(&record(&id)).await.unwrap_err();
        assert!(matches!(err, StoreError::Registration { status: 503, .. }));
        assert_eq!(store.simulation_count(), 0);
    }

    #[tokio::test]
    async fn test_model_config_and_policy_lookup() {
        let store = InMemoryArtifactStore::new();
        store.insert_model_configuration(ModelConfiguration {
            id: "mc-1".to_string(),
            semantics: Default::default(),
        });
        store.insert_policy("pol-1", InterventionPolicy::default());

        assert!(store.model_configuration("mc-1").await.is_ok());
        assert!(matches!(
            store.model_configuration("mc-2").await,
            Err(StoreError::ModelConfigNotFound(_))
        ));
        assert!(store.intervention_policy("pol-1").await.is_ok());
        assert!(matches!(
            store.intervention_policy("pol-2").await,
            Err(StoreError::PolicyNotFound(_))
        ));
    }
}
