//! # Worker Execution Path
//!
//! What actually happens when a queue worker picks up a job:
//!
//! 1. push `running` (with start stamp) to the artifact store,
//! 2. resolve the intervention policy, if the request names one,
//! 3. build the engine invocation through the registry,
//! 4. run the engine,
//! 5. push `complete` with the result files.
//!
//! Any error propagates to the queue, which settles the job as failed
//! and fires [`RecordFailureHook`] to persist the terminal `error`
//! status. The worker itself never writes `error`; that single path
//! keeps the record and the queue from disagreeing about failures.

use std::sync::Arc;

use async_trait::async_trait;
use simq_artifacts::{ArtifactStore, ProgressSink, StatusUpdate};
use simq_core::{JobId, Status};
use simq_interventions::{resolve, ResolvedInterventions};
use simq_queue::{FailureHook, JobRunner};

use crate::engine::{SimulationEngine, SimulationOutput};
use crate::error::JobError;
use crate::registry::OperationRegistry;
use crate::requests::OperationRequest;

/// Everything a worker needs to execute jobs, injected once at startup.
#[derive(Clone)]
pub struct WorkerContext {
    /// The artifact store receiving status transitions.
    pub store: Arc<dyn ArtifactStore>,
    /// The engine invoked for every operation.
    pub engine: Arc<dyn SimulationEngine>,
    /// Progress sink handed to the engine.
    pub progress: Arc<dyn ProgressSink>,
    /// Operation → invocation-builder table.
    pub registry: OperationRegistry,
}

impl WorkerContext {
    /// Execute one job to completion.
    pub async fn execute(
        &self,
        job_id: &JobId,
        request: &OperationRequest,
    ) -> Result<SimulationOutput, JobError> {
        tracing::info!(job_id = %job_id, operation = %request.kind(), "job started");
        self.store
            .update_status(job_id, StatusUpdate::to(Status::Running).started())
            .await?;

        let interventions = self.resolve_interventions(request).await?;
        let handler = self.registry.handler(request.kind())?;
        let invocation = handler(request, interventions)?;

        let output = self
            .engine
            .run(job_id, invocation, self.progress.as_ref())
            .await?;

        self.store
            .update_status(
                job_id,
                StatusUpdate::to(Status::Complete)
                    .with_result_files(output.result_files.clone())
                    .finished(),
            )
            .await?;
        tracing::info!(job_id = %job_id, files = output.result_files.len(), "job finished");
        Ok(output)
    }

    /// Resolve the request's intervention policy against its model
    /// configuration. No policy means four empty override collections.
    async fn resolve_interventions(
        &self,
        request: &OperationRequest,
    ) -> Result<ResolvedInterventions, JobError> {
        let Some(policy_id) = request.policy_id() else {
            return Ok(ResolvedInterventions::default());
        };
        let config_id = request
            .primary_model_config()
            .ok_or(JobError::MissingModelConfig(request.kind()))?;

        let policy = self.store.intervention_policy(policy_id).await?;
        let config = self.store.model_configuration(config_id).await?;
        Ok(resolve(Some(&policy), &config.semantics)?)
    }
}

/// Adapts [`WorkerContext`] to the queue's [`JobRunner`] seam.
pub struct OperationRunner {
    context: WorkerContext,
}

impl OperationRunner {
    /// Wrap a worker context.
    pub fn new(context: WorkerContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl JobRunner for OperationRunner {
    async fn run(
        &self,
        job_id: &JobId,
        operation: &str,
        payload: serde_json::Value,
    ) -> Result<serde_json::Value, String> {
        let request: OperationRequest =
            serde_json::from_value(payload).map_err(|e| format!("invalid job payload: {e}"))?;
        if request.kind().as_str() != operation {
            return Err(format!(
                "payload operation {} does not match enqueued operation {operation}",
                request.kind()
            ));
        }

        let output = self
            .context
            .execute(job_id, &request)
            .await
            .map_err(|e| e.to_string())?;
        serde_json::to_value(output).map_err(|e| format!("result serialization failed: {e}"))
    }
}

/// Failure hook that settles the artifact record as `error`.
pub struct RecordFailureHook {
    store: Arc<dyn ArtifactStore>,
}

impl RecordFailureHook {
    /// Create a hook writing to the given store.
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl FailureHook for RecordFailureHook {
    async fn on_failure(&self, job_id: &JobId, summary: &str) {
        tracing::error!(job_id = %job_id, error = %summary, "job failed, recording error status");
        if let Err(e) = self
            .store
            .update_status(job_id, StatusUpdate::to(Status::Error).finished())
            .await
        {
            // The queue still holds the failure; losing the record
            // update is logged, not fatal.
            tracing::error!(job_id = %job_id, error = %e, "failed to persist error status");
        }
    }
}
