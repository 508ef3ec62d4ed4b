//! # Application State
//!
//! Shared state for the Axum application: the gatekeeper and reconciler,
//! both built over the same injected queue and artifact store. Handlers
//! receive it via the `State` extractor; it is clone-friendly through
//! `Arc` internals.

use std::sync::Arc;

use simq_artifacts::ArtifactStore;
use simq_jobs::{Gatekeeper, StatusReconciler};
use simq_queue::JobQueue;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Accepts submissions.
    pub gatekeeper: Arc<Gatekeeper>,
    /// Answers status and cancel requests.
    pub reconciler: Arc<StatusReconciler>,
}

impl AppState {
    /// Assemble state over the given queue and artifact store.
    pub fn new(queue: Arc<dyn JobQueue>, store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            gatekeeper: Arc::new(Gatekeeper::new(Arc::clone(&queue), Arc::clone(&store))),
            reconciler: Arc::new(StatusReconciler::new(queue, store)),
        }
    }
}
