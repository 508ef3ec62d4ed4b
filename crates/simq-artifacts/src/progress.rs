//! # Progress Sink
//!
//! Engines report coarse progress through a [`ProgressSink`]. Delivery is
//! best effort: a sink that cannot be reached degrades to a warning and
//! the job keeps running. [`LogSink`] is the default local sink;
//! [`BufferSink`] collects updates for tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use simq_core::JobId;
use thiserror::Error;

/// One progress report from a running job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// The reporting job.
    pub job_id: JobId,
    /// Fraction complete in [0, 1].
    pub progress: f64,
    /// Current loss, for iterative operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss: Option<f64>,
    /// Intermediate solution, for optimization runs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_results: Option<serde_json::Value>,
}

/// Error publishing a progress update.
#[derive(Error, Debug)]
pub enum SinkError {
    /// The sink's transport could not be reached.
    #[error("progress sink unreachable: {0}")]
    Unreachable(String),
}

/// Destination for progress reports.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Publish one update.
    async fn publish(&self, update: &ProgressUpdate) -> Result<(), SinkError>;
}

/// Publish an update, downgrading any failure to a warning.
///
/// Progress is advisory; an unreachable sink must never fail a job.
pub async fn publish_best_effort(sink: &dyn ProgressSink, update: &ProgressUpdate) {
    if let Err(e) = sink.publish(update).await {
        tracing::warn!(job_id = %update.job_id, error = %e, "progress publish failed");
    }
}

/// Sink that writes updates to the log. The default when no external
/// progress transport is configured.
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl ProgressSink for LogSink {
    async fn publish(&self, update: &ProgressUpdate) -> Result<(), SinkError> {
        match update.loss {
            Some(loss) => tracing::info!(
                job_id = %update.job_id,
                progress = update.progress,
                loss,
                "job progress"
            ),
            None => tracing::info!(
                job_id = %update.job_id,
                progress = update.progress,
                "job progress"
            ),
        }
        Ok(())
    }
}

/// Sink that buffers updates in memory, for assertions in tests.
#[derive(Debug, Default)]
pub struct BufferSink {
    updates: Mutex<Vec<ProgressUpdate>>,
}

impl BufferSink {
    /// Create an empty buffer sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the updates received so far.
    pub fn updates(&self) -> Vec<ProgressUpdate> {
        self.updates.lock().clone()
    }
}

#[async_trait]
impl ProgressSink for BufferSink {
    async fn publish(&self, update: &ProgressUpdate) -> Result<(), SinkError> {
        self.updates.lock().push(update.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BrokenSink;

    #[async_trait]
    impl ProgressSink for BrokenSink {
        async fn publish(&self, _update: &ProgressUpdate) -> Result<(), SinkError> {
            Err(SinkError::Unreachable("broker down".to_string()))
        }
    }

    fn update() -> ProgressUpdate {
        ProgressUpdate {
            job_id: JobId::generate("ciemss").unwrap(),
            progress: 0.5,
            loss: Some(0.01),
            current_results: None,
        }
    }

    #[tokio::test]
    async fn test_buffer_sink_collects() {
        let sink = BufferSink::new();
        let u = update();
        sink.publish(&u).await.unwrap();
        assert_eq!(sink.updates(), vec![u]);
    }

    #[tokio::test]
    async fn test_best_effort_swallows_failure() {
        // Must not panic or propagate.
        publish_best_effort(&BrokenSink, &update()).await;
    }

    #[test]
    fn test_update_serializes_without_null_loss() {
        let u = ProgressUpdate {
            job_id: JobId::generate("ciemss").unwrap(),
            progress: 0.25,
            loss: None,
            current_results: None,
        };
        let json = serde_json::to_string(&u).unwrap();
        assert!(!json.contains("loss"));
        assert!(!json.contains("current_results"));
    }

    #[test]
    fn test_optimize_update_carries_current_results() {
        let u = ProgressUpdate {
            job_id: JobId::generate("ciemss").unwrap(),
            progress: 0.6,
            loss: None,
            current_results: Some(serde_json::json!({ "policy": [0.2, 0.8] })),
        };
        let json = serde_json::to_value(&u).unwrap();
        assert_eq!(json["current_results"]["policy"][0], 0.2);
        assert!(json.get("loss").is_none());
    }
}
