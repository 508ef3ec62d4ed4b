//! # simq-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the simulation orchestration service.
//! Binds to a configurable port (default 8000) and wires the in-process
//! queue, the artifact store client, and the engine together.

use std::sync::Arc;

use clap::Parser;
use simq_api::{app, AppState, Settings};
use simq_artifacts::{
    ArtifactStore, ArtifactStoreConfig, HttpArtifactStore, InMemoryArtifactStore, LogSink,
};
use simq_jobs::{OperationRegistry, OperationRunner, StubEngine, WorkerContext};
use simq_queue::InMemoryQueue;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::parse();

    let store: Arc<dyn ArtifactStore> = if settings.standalone {
        tracing::warn!("standalone mode, simulation records are held in memory only");
        Arc::new(InMemoryArtifactStore::new())
    } else {
        let mut config = ArtifactStoreConfig::new(settings.artifact_store_url.clone());
        if let (Some(user), Some(password)) = (
            settings.artifact_store_user.clone(),
            settings.artifact_store_password.clone(),
        ) {
            config = config.with_basic_auth(user, password);
        }
        tracing::info!(url = %settings.artifact_store_url, "artifact store client configured");
        Arc::new(HttpArtifactStore::new(config)?)
    };

    let context = WorkerContext {
        store: Arc::clone(&store),
        engine: Arc::new(StubEngine),
        progress: Arc::new(LogSink),
        registry: OperationRegistry::standard(),
    };
    let queue = Arc::new(InMemoryQueue::new(Arc::new(OperationRunner::new(context))));

    let state = AppState::new(queue, store);
    let router = app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], settings.port));
    tracing::info!("simq API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
