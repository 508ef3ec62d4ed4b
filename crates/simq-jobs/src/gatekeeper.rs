//! # Job Submission Gatekeeper
//!
//! The single entry point for new work. A submission:
//!
//! 1. picks or validates the job id (`{engine}-{uuid}`),
//! 2. registers the `queued` simulation record with the artifact store,
//!    aborting the whole submission if registration fails,
//! 3. checks the queue for a live entry under that id (only reachable
//!    with an externally supplied id): without `force_restart` the entry
//!    is reused, with it the entry is purged and re-enqueued,
//! 4. enqueues with the record-settling failure hook attached,
//! 5. optionally polls until the job settles (synchronous mode).
//!
//! The reuse-or-restart check is advisory: it is a fetch followed by an
//! enqueue, so two submissions racing on the same external id can both
//! enqueue. The queue keeps at most one live entry per id either way.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use simq_artifacts::{ArtifactStore, SimulationRecord};
use simq_core::JobId;
use simq_queue::{EnqueueRequest, FailureHook, JobQueue, QueueError};
use tokio::time::Instant;

use crate::error::JobError;
use crate::requests::OperationRequest;
use crate::worker::RecordFailureHook;

/// Engine targeted when the caller does not name one.
pub const DEFAULT_ENGINE: &str = "ciemss";

/// Interval between status polls in synchronous mode.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Typed submission options.
#[derive(Debug, Clone)]
pub struct SubmitOptions {
    /// Engine prefix for the job id.
    pub engine: String,
    /// Purge any live queue entry under the id and enqueue afresh.
    pub force_restart: bool,
    /// Block until the job settles (or the timeout passes).
    pub synchronous: bool,
    /// Upper bound on the synchronous wait.
    pub timeout: Duration,
    /// Externally supplied job id; a fresh one is generated when absent.
    pub job_id: Option<JobId>,
}

impl Default for SubmitOptions {
    fn default() -> Self {
        Self {
            engine: DEFAULT_ENGINE.to_string(),
            force_restart: false,
            synchronous: false,
            timeout: Duration::from_secs(60),
            job_id: None,
        }
    }
}

/// What a successful submission returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitReceipt {
    /// The id under which the job was registered and enqueued.
    pub simulation_id: JobId,
}

/// Accepts operation requests and turns them into registered, enqueued
/// jobs.
pub struct Gatekeeper {
    queue: Arc<dyn JobQueue>,
    store: Arc<dyn ArtifactStore>,
    failure_hook: Arc<dyn FailureHook>,
}

impl Gatekeeper {
    /// Create a gatekeeper over the given queue and store. Failed jobs
    /// settle their record through a [`RecordFailureHook`] on the same
    /// store.
    pub fn new(queue: Arc<dyn JobQueue>, store: Arc<dyn ArtifactStore>) -> Self {
        let failure_hook = Arc::new(RecordFailureHook::new(Arc::clone(&store)));
        Self {
            queue,
            store,
            failure_hook,
        }
    }

    /// Submit one operation request.
    pub async fn submit(
        &self,
        request: OperationRequest,
        options: SubmitOptions,
    ) -> Result<SubmitReceipt, JobError> {
        let job_id = match &options.job_id {
            Some(id) => id.clone(),
            None => JobId::generate(&options.engine)?,
        };
        let payload = serde_json::to_value(&request)?;

        // Register first. If the system of record will not accept the
        // job, nothing may reach the queue.
        let record = SimulationRecord::queued(job_id.clone(), options.engine.clone(), payload.clone());
        self.store.create_simulation(&record).await?;

        let existing = self.queue.fetch(&job_id).await?;
        let enqueue = match existing {
            None => true,
            Some(_) if options.force_restart => {
                tracing::info!(job_id = %job_id, "force restart, purging live queue entry");
                self.queue.cleanup(&job_id, Duration::ZERO).await?;
                true
            }
            Some(_) => {
                tracing::info!(job_id = %job_id, "live queue entry reused");
                false
            }
        };

        if enqueue {
            self.queue
                .enqueue(EnqueueRequest {
                    job_id: job_id.clone(),
                    operation: request.kind().as_str().to_string(),
                    payload,
                    on_failure: Some(Arc::clone(&self.failure_hook)),
                })
                .await?;
        }

        if options.synchronous {
            self.wait_for_settlement(&job_id, options.timeout).await?;
        }

        Ok(SubmitReceipt {
            simulation_id: job_id,
        })
    }

    /// Poll the queue until the job settles, the entry disappears, or
    /// the timeout passes. Timing out is not an error; the job simply
    /// keeps running.
    async fn wait_for_settlement(&self, job_id: &JobId, timeout: Duration) -> Result<(), JobError> {
        let deadline = Instant::now() + timeout;
        loop {
            match self.queue.status(job_id).await {
                Ok(status) if status.is_settled() => return Ok(()),
                // Entry already reclaimed; the record holds the outcome.
                Err(QueueError::NotFound(_)) => return Ok(()),
                Err(other) => return Err(other.into()),
                Ok(_) => {}
            }
            if Instant::now() >= deadline {
                tracing::warn!(job_id = %job_id, "synchronous wait timed out, job still running");
                return Ok(());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StubEngine;
    use crate::registry::OperationRegistry;
    use crate::requests::{SimulateRequest, Timespan};
    use crate::worker::{OperationRunner, WorkerContext};
    use simq_artifacts::{BufferSink, InMemoryArtifactStore};
    use simq_core::{QueueStatus, Status};
    use simq_queue::InMemoryQueue;

    fn stack() -> (Arc<InMemoryQueue>, Arc<InMemoryArtifactStore>, Gatekeeper) {
        let store = Arc::new(InMemoryArtifactStore::new());
        let context = WorkerContext {
            store: store.clone(),
            engine: Arc::new(StubEngine),
            progress: Arc::new(BufferSink::new()),
            registry: OperationRegistry::standard(),
        };
        let queue = Arc::new(InMemoryQueue::new(Arc::new(OperationRunner::new(context))));
        let gatekeeper = Gatekeeper::new(queue.clone(), store.clone());
        (queue, store, gatekeeper)
    }

    fn simulate_request() -> OperationRequest {
        OperationRequest::Simulate(SimulateRequest {
            model_config_id: "mc-1".to_string(),
            timespan: Timespan {
                start: 0.0,
                end: 90.0,
            },
            policy_id: None,
            step_size: 1.0,
            num_samples: 100,
            inferred_parameters: None,
        })
    }

    async fn wait_settled(queue: &InMemoryQueue, job_id: &JobId) -> QueueStatus {
        for _ in 0..1000 {
            if let Ok(status) = queue.status(job_id).await {
                if status.is_settled() {
                    return status;
                }
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("job {job_id} never settled");
    }

    #[tokio::test]
    async fn test_submit_registers_and_runs_to_complete() {
        let (queue, store, gatekeeper) = stack();
        let receipt = gatekeeper
            .submit(simulate_request(), SubmitOptions::default())
            .await
            .unwrap();
        let id = receipt.simulation_id;
        assert_eq!(id.engine(), DEFAULT_ENGINE);

        // Registered before execution.
        assert!(store.get_simulation(&id).await.is_ok());

        assert_eq!(wait_settled(&queue, &id).await, QueueStatus::Finished);
        // The worker path pushed the terminal record state.
        for _ in 0..100 {
            if store.get_simulation(&id).await.unwrap().status == Status::Complete {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        let record = store.get_simulation(&id).await.unwrap();
        assert_eq!(record.status, Status::Complete);
        assert!(!record.result_files.is_empty());
    }

    #[tokio::test]
    async fn test_registration_failure_aborts_before_enqueue() {
        let (queue, store, gatekeeper) = stack();
        store.set_reject_creates(true);

        let err = gatekeeper
            .submit(simulate_request(), SubmitOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            JobError::Store(simq_artifacts::StoreError::Registration { .. })
        ));
        assert!(queue.is_empty(), "nothing may reach the queue");
    }

    #[tokio::test]
    async fn test_synchronous_submit_returns_settled() {
        let (queue, _store, gatekeeper) = stack();
        let receipt = gatekeeper
            .submit(
                simulate_request(),
                SubmitOptions {
                    synchronous: true,
                    timeout: Duration::from_secs(5),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let status = queue.status(&receipt.simulation_id).await.unwrap();
        assert!(status.is_settled());
    }

    #[tokio::test]
    async fn test_external_id_reused_without_restart() {
        let (queue, _store, gatekeeper) = stack();
        let id = JobId::generate("ciemss").unwrap();
        let options = SubmitOptions {
            job_id: Some(id.clone()),
            ..Default::default()
        };

        gatekeeper
            .submit(simulate_request(), options.clone())
            .await
            .unwrap();
        wait_settled(&queue, &id).await;
        let first_result = queue.result(&id).await.unwrap();
        assert!(first_result.is_some());

        // Same id, no restart: the settled entry is left untouched.
        gatekeeper
            .submit(simulate_request(), options)
            .await
            .unwrap();
        assert_eq!(queue.status(&id).await.unwrap(), QueueStatus::Finished);
        assert_eq!(queue.result(&id).await.unwrap(), first_result);
    }

    #[tokio::test]
    async fn test_force_restart_purges_and_reenqueues() {
        let (queue, _store, gatekeeper) = stack();
        let id = JobId::generate("ciemss").unwrap();

        gatekeeper
            .submit(
                simulate_request(),
                SubmitOptions {
                    job_id: Some(id.clone()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        wait_settled(&queue, &id).await;
        assert!(queue.result(&id).await.unwrap().is_some());

        // Restart: prior result is purged, the job re-enters queued.
        // On the single-threaded test runtime the fresh worker task has
        // not run yet when submit returns.
        gatekeeper
            .submit(
                simulate_request(),
                SubmitOptions {
                    job_id: Some(id.clone()),
                    force_restart: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(queue.status(&id).await.unwrap(), QueueStatus::Queued);
        assert!(queue.result(&id).await.unwrap().is_none());

        assert_eq!(wait_settled(&queue, &id).await, QueueStatus::Finished);
    }
}
