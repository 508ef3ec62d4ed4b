//! # HTTP Artifact Store Client
//!
//! Production implementation of [`ArtifactStore`] against the live
//! artifact store's REST surface:
//!
//! - `POST /simulations` — register a record
//! - `GET /simulations/{id}` / `PUT /simulations/{id}` — read and update
//! - `GET /model-configurations/{id}` — model semantics
//! - `GET /interventions/{id}` — intervention policies
//!
//! Status updates are read-modify-write: fetch the record, apply the
//! [`StatusUpdate`](crate::record::StatusUpdate) via
//! [`SimulationRecord::apply`], and PUT the result back.
//!
//! Retries are NOT built into the client; callers own their retry policy.

use std::time::Duration;

use async_trait::async_trait;
use simq_core::JobId;
use simq_interventions::InterventionPolicy;

use crate::record::{ModelConfiguration, SimulationRecord, StatusUpdate};
use crate::store::{ArtifactStore, StoreError};

/// Configuration for the HTTP artifact store client.
#[derive(Debug, Clone)]
pub struct ArtifactStoreConfig {
    /// Base URL of the artifact store (e.g. `http://data-service:8000`).
    pub base_url: String,
    /// Basic-auth username, when the store requires credentials.
    pub username: Option<String>,
    /// Basic-auth password.
    pub password: Option<String>,
    /// Request timeout in seconds (default: 30).
    pub timeout_secs: u64,
}

impl ArtifactStoreConfig {
    /// Create a configuration with default timeout and no credentials.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            username: None,
            password: None,
            timeout_secs: 30,
        }
    }

    /// Attach basic-auth credentials.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }
}

/// reqwest-backed artifact store client.
///
/// `Send + Sync`, designed to be shared via `Arc` across async tasks.
#[derive(Debug)]
pub struct HttpArtifactStore {
    client: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl HttpArtifactStore {
    /// Build a client from configuration.
    pub fn new(config: ArtifactStoreConfig) -> Result<Self, StoreError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StoreError::Transport(format!("failed to build HTTP client: {e}")))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            username: config.username,
            password: config.password,
        })
    }

    fn authed(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.username {
            Some(user) => request.basic_auth(user, self.password.as_deref()),
            None => request,
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        operation: &str,
    ) -> Result<reqwest::Response, StoreError> {
        self.authed(request)
            .send()
            .await
            .map_err(|e| StoreError::Transport(format!("{operation}: {e}")))
    }
}

#[async_trait]
impl ArtifactStore for HttpArtifactStore {
    async fn create_simulation(&self, record: &SimulationRecord) -> Result<(), StoreError> {
        let url = format!("{}/simulations", self.base_url);
        let resp = self
            .send(self.client.post(&url).json(record), "create_simulation")
            .await?;

        // Anything outside the 2xx class means the record did not land;
        // the submission must abort before touching the queue.
        let status = resp.status();
        if status.as_u16() >= 300 {
            return Err(StoreError::Registration {
                id: record.id.clone(),
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    async fn get_simulation(&self, id: &JobId) -> Result<SimulationRecord, StoreError> {
        let url = format!("{}/simulations/{}", self.base_url, id);
        let resp = self.send(self.client.get(&url), "get_simulation").await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.clone()));
        }
        if !resp.status().is_success() {
            return Err(StoreError::Transport(format!(
                "get_simulation {id}: HTTP {}",
                resp.status()
            )));
        }
        resp.json()
            .await
            .map_err(|e| StoreError::Transport(format!("get_simulation {id}: {e}")))
    }

    async fn update_status(&self, id: &JobId, update: StatusUpdate) -> Result<(), StoreError> {
        let mut record = self.get_simulation(id).await?;
        record.apply(&update);

        let url = format!("{}/simulations/{}", self.base_url, id);
        let resp = self
            .send(self.client.put(&url).json(&record), "update_status")
            .await?;
        if !resp.status().is_success() {
            return Err(StoreError::Transport(format!(
                "update_status {id}: HTTP {}",
                resp.status()
            )));
        }
        tracing::debug!(job_id = %id, status = %record.status, "pushed status to artifact store");
        Ok(())
    }

    async fn model_configuration(
        &self,
        config_id: &str,
    ) -> Result<ModelConfiguration, StoreError> {
        let url = format!("{}/model-configurations/{}", self.base_url, config_id);
        let resp = self
            .send(self.client.get(&url), "model_configuration")
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::ModelConfigNotFound(config_id.to_string()));
        }
        if !resp.status().is_success() {
            return Err(StoreError::Transport(format!(
                "model_configuration {config_id}: HTTP {}",
                resp.status()
            )));
        }
        resp.json()
            .await
            .map_err(|e| StoreError::Transport(format!("model_configuration {config_id}: {e}")))
    }

    async fn intervention_policy(
        &self,
        policy_id: &str,
    ) -> Result<InterventionPolicy, StoreError> {
        let url = format!("{}/interventions/{}", self.base_url, policy_id);
        let resp = self
            .send(self.client.get(&url), "intervention_policy")
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::PolicyNotFound(policy_id.to_string()));
        }
        if !resp.status().is_success() {
            return Err(StoreError::Transport(format!(
                "intervention_policy {policy_id}: HTTP {}",
                resp.status()
            )));
        }
        resp.json()
            .await
            .map_err(|e| StoreError::Transport(format!("intervention_policy {policy_id}: {e}")))
    }
}
