//! # In-Memory Queue
//!
//! A [`JobQueue`] implementation that executes jobs on tokio tasks, one
//! task per enqueue. Job entries live in a `parking_lot` map; the lock is
//! never held across an `.await` point, so all map operations stay
//! synchronous and cheap.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use simq_core::{JobId, QueueStatus, Timestamp};

use crate::traits::{
    EnqueueRequest, FailureHook, JobQueue, JobRunner, JobSnapshot, QueueError,
};

#[derive(Debug, Clone)]
struct JobEntry {
    /// Ties the entry to the task spawned for it. A task whose
    /// generation no longer matches writes nothing.
    generation: u64,
    status: QueueStatus,
    created_at: Timestamp,
    enqueued_at: Timestamp,
    started_at: Option<Timestamp>,
    result: Option<serde_json::Value>,
    error_info: Option<String>,
    cancel_requested: bool,
}

impl JobEntry {
    fn new(generation: u64) -> Self {
        let now = Timestamp::now();
        Self {
            generation,
            status: QueueStatus::Queued,
            created_at: now,
            enqueued_at: now,
            started_at: None,
            result: None,
            error_info: None,
            cancel_requested: false,
        }
    }
}

/// In-memory job queue executing on tokio tasks.
///
/// Each enqueue spawns exactly one task. The task claims its entry
/// (queued → started) before invoking the runner; a cancel flag set
/// before the claim wins, and the runner is never invoked. Re-enqueueing
/// an id that still has a live entry replaces the entry and spawns a
/// fresh task; callers that need reuse-or-restart semantics check first
/// via [`JobQueue::fetch`].
///
/// Every entry carries the generation stamped at its enqueue, and the
/// spawned task only writes while the stored generation still matches
/// its own. A task orphaned by a purge-and-re-enqueue of the same id
/// therefore cannot claim or settle the replacement entry.
pub struct InMemoryQueue {
    jobs: Arc<RwLock<HashMap<JobId, JobEntry>>>,
    runner: Arc<dyn JobRunner>,
    next_generation: AtomicU64,
}

impl InMemoryQueue {
    /// Create a queue that executes jobs with the given runner.
    pub fn new(runner: Arc<dyn JobRunner>) -> Self {
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            runner,
            next_generation: AtomicU64::new(0),
        }
    }

    /// Number of entries currently held (settled entries included, until
    /// cleaned up).
    pub fn len(&self) -> usize {
        self.jobs.read().len()
    }

    /// Whether the queue holds no entries.
    pub fn is_empty(&self) -> bool {
        self.jobs.read().is_empty()
    }
}

#[async_trait::async_trait]
impl JobQueue for InMemoryQueue {
    async fn enqueue(&self, request: EnqueueRequest) -> Result<(), QueueError> {
        let EnqueueRequest {
            job_id,
            operation,
            payload,
            on_failure,
        } = request;

        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        self.jobs
            .write()
            .insert(job_id.clone(), JobEntry::new(generation));
        tracing::info!(job_id = %job_id, operation = %operation, "job enqueued");

        let jobs = Arc::clone(&self.jobs);
        let runner = Arc::clone(&self.runner);
        tokio::spawn(async move {
            // Claim the entry. A cancel that landed first wins here, and
            // an entry replaced by a re-enqueue belongs to another task.
            {
                let mut guard = jobs.write();
                match guard.get_mut(&job_id) {
                    Some(entry) if entry.generation != generation => return,
                    Some(entry) if entry.cancel_requested => {
                        entry.status = QueueStatus::Canceled;
                        return;
                    }
                    Some(entry) => {
                        entry.status = QueueStatus::Started;
                        entry.started_at = Some(Timestamp::now());
                    }
                    // Entry purged before pickup.
                    None => return,
                }
            }

            let outcome = runner.run(&job_id, &operation, payload).await;

            let failure = {
                let mut guard = jobs.write();
                match (guard.get_mut(&job_id), outcome) {
                    (None, _) => None,
                    // The entry was purged and re-enqueued while this
                    // task ran; its outcome belongs to a dead run.
                    (Some(entry), _) if entry.generation != generation => None,
                    (Some(entry), _) if entry.cancel_requested => {
                        // Cancelled mid-flight: the invocation ran to its
                        // end, but the job settles as cancelled and its
                        // outcome is discarded.
                        entry.status = QueueStatus::Canceled;
                        None
                    }
                    (Some(entry), Ok(result)) => {
                        entry.status = QueueStatus::Finished;
                        entry.result = Some(result);
                        None
                    }
                    (Some(entry), Err(summary)) => {
                        entry.status = QueueStatus::Failed;
                        entry.error_info = Some(summary.clone());
                        Some(summary)
                    }
                }
            };

            if let Some(summary) = failure {
                tracing::error!(job_id = %job_id, error = %summary, "job failed");
                if let Some(hook) = on_failure {
                    hook.on_failure(&job_id, &summary).await;
                }
            }
        });

        Ok(())
    }

    async fn fetch(&self, job_id: &JobId) -> Result<Option<JobSnapshot>, QueueError> {
        let guard = self.jobs.read();
        Ok(guard.get(job_id).map(|entry| JobSnapshot {
            id: job_id.clone(),
            status: entry.status,
            created_at: entry.created_at,
            enqueued_at: entry.enqueued_at,
            started_at: entry.started_at,
            result: entry.result.clone(),
            error_info: entry.error_info.clone(),
        }))
    }

    async fn cancel(&self, job_id: &JobId) -> Result<(), QueueError> {
        let mut guard = self.jobs.write();
        let entry = guard
            .get_mut(job_id)
            .ok_or_else(|| QueueError::NotFound(job_id.clone()))?;
        entry.cancel_requested = true;
        if matches!(
            entry.status,
            QueueStatus::Queued | QueueStatus::Deferred | QueueStatus::Scheduled
        ) {
            entry.status = QueueStatus::Canceled;
        }
        Ok(())
    }

    async fn status(&self, job_id: &JobId) -> Result<QueueStatus, QueueError> {
        self.jobs
            .read()
            .get(job_id)
            .map(|entry| entry.status)
            .ok_or_else(|| QueueError::NotFound(job_id.clone()))
    }

    async fn result(&self, job_id: &JobId) -> Result<Option<serde_json::Value>, QueueError> {
        self.jobs
            .read()
            .get(job_id)
            .map(|entry| entry.result.clone())
            .ok_or_else(|| QueueError::NotFound(job_id.clone()))
    }

    async fn error_info(&self, job_id: &JobId) -> Result<Option<String>, QueueError> {
        self.jobs
            .read()
            .get(job_id)
            .map(|entry| entry.error_info.clone())
            .ok_or_else(|| QueueError::NotFound(job_id.clone()))
    }

    async fn cleanup(&self, job_id: &JobId, _ttl: Duration) -> Result<(), QueueError> {
        // The in-memory backend has no deferred reclamation; any ttl
        // releases the entry immediately.
        self.jobs
            .write()
            .remove(job_id)
            .map(|_| ())
            .ok_or_else(|| QueueError::NotFound(job_id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Notify;

    /// Runner that records whether it ran and returns a fixed outcome.
    struct RecordingRunner {
        ran: AtomicBool,
        fail_with: Option<String>,
    }

    impl RecordingRunner {
        fn succeeding() -> Arc<Self> {
            Arc::new(Self {
                ran: AtomicBool::new(false),
                fail_with: None,
            })
        }

        fn failing(summary: &str) -> Arc<Self> {
            Arc::new(Self {
                ran: AtomicBool::new(false),
                fail_with: Some(summary.to_string()),
            })
        }
    }

    #[async_trait::async_trait]
    impl JobRunner for RecordingRunner {
        async fn run(
            &self,
            _job_id: &JobId,
            operation: &str,
            _payload: serde_json::Value,
        ) -> Result<serde_json::Value, String> {
            self.ran.store(true, Ordering::SeqCst);
            match &self.fail_with {
                Some(summary) => Err(summary.clone()),
                None => Ok(serde_json::json!({ "operation": operation })),
            }
        }
    }

    /// Runner that blocks until released, for exercising the started state.
    struct GatedRunner {
        gate: Notify,
    }

    #[async_trait::async_trait]
    impl JobRunner for GatedRunner {
        async fn run(
            &self,
            _job_id: &JobId,
            _operation: &str,
            _payload: serde_json::Value,
        ) -> Result<serde_json::Value, String> {
            self.gate.notified().await;
            Ok(serde_json::json!({}))
        }
    }

    /// Failure hook that records every invocation.
    #[derive(Default)]
    struct RecordingHook {
        calls: Mutex<Vec<(JobId, String)>>,
    }

    #[async_trait::async_trait]
    impl FailureHook for RecordingHook {
        async fn on_failure(&self, job_id: &JobId, summary: &str) {
            self.calls
                .lock()
                .push((job_id.clone(), summary.to_string()));
        }
    }

    fn request(job_id: &JobId, hook: Option<Arc<dyn FailureHook>>) -> EnqueueRequest {
        EnqueueRequest {
            job_id: job_id.clone(),
            operation: "simulate".to_string(),
            payload: serde_json::json!({"model_config_id": "mc-1"}),
            on_failure: hook,
        }
    }

    /// Poll until the job settles or the deadline passes.
    async fn wait_settled(queue: &InMemoryQueue, job_id: &JobId) -> QueueStatus {
        for _ in 0..1000 {
            let status = queue.status(job_id).await.unwrap();
            if status.is_settled() {
                return status;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("job {job_id} never settled");
    }

    /// Poll until the job reports started.
    async fn wait_started(queue: &InMemoryQueue, job_id: &JobId) {
        for _ in 0..1000 {
            if queue.status(job_id).await.unwrap() == QueueStatus::Started {
                return;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("job {job_id} never started");
    }

    // ── happy path ──

    #[tokio::test]
    async fn test_enqueue_runs_to_finished() {
        let queue = InMemoryQueue::new(RecordingRunner::succeeding());
        let id = JobId::generate("ciemss").unwrap();
        queue.enqueue(request(&id, None)).await.unwrap();

        assert_eq!(wait_settled(&queue, &id).await, QueueStatus::Finished);
        let result = queue.result(&id).await.unwrap().unwrap();
        assert_eq!(result["operation"], "simulate");
        assert!(queue.error_info(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fetch_snapshot_fields() {
        let queue = InMemoryQueue::new(RecordingRunner::succeeding());
        let id = JobId::generate("ciemss").unwrap();
        queue.enqueue(request(&id, None)).await.unwrap();
        wait_settled(&queue, &id).await;

        let snapshot = queue.fetch(&id).await.unwrap().unwrap();
        assert_eq!(snapshot.id, id);
        assert_eq!(snapshot.status, QueueStatus::Finished);
        assert_eq!(snapshot.created_at, snapshot.enqueued_at);
        assert!(snapshot.started_at.is_some());
        assert!(snapshot.result.is_some());
        assert!(snapshot.error_info.is_none());
    }

    #[tokio::test]
    async fn test_fetch_unknown_is_none() {
        let queue = InMemoryQueue::new(RecordingRunner::succeeding());
        let id = JobId::generate("ciemss").unwrap();
        assert!(queue.fetch(&id).await.unwrap().is_none());
    }

    // ── failure path ──

    #[tokio::test]
    async fn test_failed_job_records_error_and_fires_hook() {
        let queue = InMemoryQueue::new(RecordingRunner::failing("engine exploded"));
        let hook = Arc::new(RecordingHook::default());
        let id = JobId::generate("ciemss").unwrap();
        queue
            .enqueue(request(&id, Some(hook.clone())))
            .await
            .unwrap();

        assert_eq!(wait_settled(&queue, &id).await, QueueStatus::Failed);
        assert_eq!(
            queue.error_info(&id).await.unwrap().as_deref(),
            Some("engine exploded")
        );
        assert!(queue.result(&id).await.unwrap().is_none());

        // Hook may run just after the status flips; give it a moment.
        for _ in 0..100 {
            if !hook.calls.lock().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        let calls = hook.calls.lock();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, id);
        assert_eq!(calls[0].1, "engine exploded");
    }

    #[tokio::test]
    async fn test_hook_not_fired_on_success() {
        let queue = InMemoryQueue::new(RecordingRunner::succeeding());
        let hook = Arc::new(RecordingHook::default());
        let id = JobId::generate("ciemss").unwrap();
        queue
            .enqueue(request(&id, Some(hook.clone())))
            .await
            .unwrap();
        wait_settled(&queue, &id).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(hook.calls.lock().is_empty());
    }

    // ── cancellation ──

    #[tokio::test]
    async fn test_cancel_before_claim_never_executes() {
        // Single-threaded test runtime: the spawned worker task cannot
        // run between the enqueue and cancel calls below because neither
        // yields to the scheduler.
        let runner = RecordingRunner::succeeding();
        let queue = InMemoryQueue::new(runner.clone());
        let id = JobId::generate("ciemss").unwrap();
        queue.enqueue(request(&id, None)).await.unwrap();
        queue.cancel(&id).await.unwrap();

        assert_eq!(wait_settled(&queue, &id).await, QueueStatus::Canceled);
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(!runner.ran.load(Ordering::SeqCst), "runner must not execute");
    }

    #[tokio::test]
    async fn test_cancel_started_job_is_cooperative() {
        let runner = Arc::new(GatedRunner {
            gate: Notify::new(),
        });
        let queue = InMemoryQueue::new(runner.clone());
        let id = JobId::generate("ciemss").unwrap();
        queue.enqueue(request(&id, None)).await.unwrap();
        wait_started(&queue, &id).await;

        // Cancelling a started job flags it but does not interrupt it.
        queue.cancel(&id).await.unwrap();
        assert_eq!(queue.status(&id).await.unwrap(), QueueStatus::Started);

        runner.gate.notify_one();
        assert_eq!(wait_settled(&queue, &id).await, QueueStatus::Canceled);
        assert!(queue.result(&id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cancel_unknown_is_not_found() {
        let queue = InMemoryQueue::new(RecordingRunner::succeeding());
        let id = JobId::generate("ciemss").unwrap();
        assert!(matches!(
            queue.cancel(&id).await,
            Err(QueueError::NotFound(_))
        ));
    }

    // ── re-enqueue after purge ──

    /// Runner whose first run blocks on the gate and reports "old"; every
    /// later run returns "new" immediately.
    struct TwoRunRunner {
        calls: std::sync::atomic::AtomicU32,
        gate: Notify,
    }

    impl TwoRunRunner {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: std::sync::atomic::AtomicU32::new(0),
                gate: Notify::new(),
            })
        }
    }

    #[async_trait::async_trait]
    impl JobRunner for TwoRunRunner {
        async fn run(
            &self,
            _job_id: &JobId,
            _operation: &str,
            _payload: serde_json::Value,
        ) -> Result<serde_json::Value, String> {
            if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
                self.gate.notified().await;
                Ok(serde_json::json!({ "run": "old" }))
            } else {
                Ok(serde_json::json!({ "run": "new" }))
            }
        }
    }

    #[tokio::test]
    async fn test_orphaned_task_cannot_write_into_replacement_entry() {
        let runner = TwoRunRunner::new();
        let queue = InMemoryQueue::new(runner.clone());
        let id = JobId::generate("ciemss").unwrap();

        queue.enqueue(request(&id, None)).await.unwrap();
        wait_started(&queue, &id).await;

        // Purge the started job and enqueue the same id afresh. The old
        // task is still blocked inside its runner invocation.
        queue.cleanup(&id, Duration::ZERO).await.unwrap();
        queue.enqueue(request(&id, None)).await.unwrap();
        assert_eq!(queue.status(&id).await.unwrap(), QueueStatus::Queued);

        // Release the orphaned task; its settle must not touch the
        // replacement entry.
        runner.gate.notify_one();
        assert_eq!(wait_settled(&queue, &id).await, QueueStatus::Finished);
        tokio::time::sleep(Duration::from_millis(5)).await;

        let result = queue.result(&id).await.unwrap().unwrap();
        assert_eq!(result["run"], "new", "stale outcome must be discarded");
        assert_eq!(queue.status(&id).await.unwrap(), QueueStatus::Finished);
    }

    // ── cleanup ──

    #[tokio::test]
    async fn test_cleanup_releases_entry() {
        let queue = InMemoryQueue::new(RecordingRunner::succeeding());
        let id = JobId::generate("ciemss").unwrap();
        queue.enqueue(request(&id, None)).await.unwrap();
        wait_settled(&queue, &id).await;

        queue.cleanup(&id, Duration::ZERO).await.unwrap();
        assert!(queue.fetch(&id).await.unwrap().is_none());
        assert!(matches!(
            queue.status(&id).await,
            Err(QueueError::NotFound(_))
        ));
        assert!(queue.is_empty());
    }

    #[tokio::test]
    async fn test_cleanup_unknown_is_not_found() {
        let queue = InMemoryQueue::new(RecordingRunner::succeeding());
        let id = JobId::generate("ciemss").unwrap();
        assert!(matches!(
            queue.cleanup(&id, Duration::ZERO).await,
            Err(QueueError::NotFound(_))
        ));
    }
}
