//! # simq-api — Axum HTTP Surface
//!
//! The HTTP service over the job orchestration layer, built on
//! Axum/Tower/Tokio.
//!
//! ## API Surface
//!
//! | Route                          | Handler                       |
//! |--------------------------------|-------------------------------|
//! | `POST /simulate`               | [`routes::simulate`]          |
//! | `POST /calibrate`              | [`routes::calibrate`]         |
//! | `POST /ensemble-simulate`      | [`routes::ensemble_simulate`] |
//! | `POST /ensemble-calibrate`     | [`routes::ensemble_calibrate`]|
//! | `POST /optimize`               | [`routes::optimize`]          |
//! | `GET /status/{simulation_id}`  | [`routes::status`]            |
//! | `GET /cancel/{simulation_id}`  | [`routes::cancel`]            |
//! | `GET /health`                  | health probe                  |
//!
//! ## Crate Policy
//!
//! - Sits at the top of the dependency DAG.
//! - No business logic in route handlers; they delegate to
//!   `simq_jobs::Gatekeeper` and `simq_jobs::StatusReconciler`.
//! - All errors map to structured HTTP responses via [`AppError`].

pub mod error;
pub mod routes;
pub mod settings;
pub mod state;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use error::AppError;
pub use settings::Settings;
pub use state::AppState;

/// Assemble the application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/simulate", post(routes::simulate))
        .route("/calibrate", post(routes::calibrate))
        .route("/ensemble-simulate", post(routes::ensemble_simulate))
        .route("/ensemble-calibrate", post(routes::ensemble_calibrate))
        .route("/optimize", post(routes::optimize))
        .route("/status/{simulation_id}", get(routes::status))
        .route("/cancel/{simulation_id}", get(routes::cancel))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health probe, returns 200 while the process serves requests.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use simq_artifacts::{BufferSink, InMemoryArtifactStore};
    use simq_core::{JobId, QueueStatus, Status};
    use simq_jobs::{OperationRegistry, OperationRunner, StubEngine, WorkerContext};
    use simq_queue::{InMemoryQueue, JobQueue};
    use tower::ServiceExt;

    fn test_app() -> (Router, Arc<InMemoryQueue>) {
        let store = Arc::new(InMemoryArtifactStore::new());
        let context = WorkerContext {
            store: store.clone(),
            engine: Arc::new(StubEngine),
            progress: Arc::new(BufferSink::new()),
            registry: OperationRegistry::standard(),
        };
        let queue = Arc::new(InMemoryQueue::new(Arc::new(OperationRunner::new(context))));
        let state = AppState::new(queue.clone(), store);
        (app(state), queue)
    }

    fn simulate_body() -> Value {
        json!({
            "model_config_id": "mc-1",
            "timespan": { "start": 0.0, "end": 90.0 }
        })
    }

    async fn json_response(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn post_json(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn wait_settled(queue: &InMemoryQueue, job_id: &JobId) {
        for _ in 0..1000 {
            if let Ok(status) = queue.status(job_id).await {
                if status.is_settled() {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
        panic!("job {job_id} never settled");
    }

    #[tokio::test]
    async fn test_health() {
        let (app, _queue) = test_app();
        let response = app.oneshot(get_request("/health")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_simulate_returns_simulation_id() {
        let (app, _queue) = test_app();
        let (status, body) = json_response(&app, post_json("/simulate", &simulate_body())).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["simulation_id"].as_str().unwrap();
        assert!(id.starts_with("ciemss-"), "unexpected id: {id}");
        JobId::parse(id).unwrap();
    }

    #[tokio::test]
    async fn test_submit_then_poll_to_complete() {
        let (app, queue) = test_app();
        let (_, body) = json_response(&app, post_json("/simulate", &simulate_body())).await;
        let id = JobId::parse(body["simulation_id"].as_str().unwrap()).unwrap();
        wait_settled(&queue, &id).await;

        let (status, body) = json_response(&app, get_request(&format!("/status/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], Status::Complete.as_str());
        assert!(body["result"].is_object());

        // The queue entry was reclaimed on the first terminal read; the
        // record keeps answering.
        let (status, body) = json_response(&app, get_request(&format!("/status/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], Status::Complete.as_str());
        assert!(body.get("result").is_none());
    }

    #[tokio::test]
    async fn test_cancel_queued_job() {
        let (app, queue) = test_app();
        let (_, body) = json_response(&app, post_json("/calibrate", &calibrate_body())).await;
        let id = JobId::parse(body["simulation_id"].as_str().unwrap()).unwrap();

        // On the single-threaded test runtime the worker has not claimed
        // the job yet, so the cancel settles it as cancelled.
        let (status, body) = json_response(&app, get_request(&format!("/cancel/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], Status::Cancelled.as_str());
        assert_eq!(queue.status(&id).await.unwrap(), QueueStatus::Canceled);
    }

    fn calibrate_body() -> Value {
        json!({
            "model_config_id": "mc-1",
            "dataset": { "id": "ds-1", "filename": "observations.csv" },
            "timespan": { "start": 0.0, "end": 90.0 }
        })
    }

    #[tokio::test]
    async fn test_status_unknown_id_is_404() {
        let (app, _queue) = test_app();
        let id = JobId::generate("ciemss").unwrap();
        let (status, body) = json_response(&app, get_request(&format!("/status/{id}"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_status_malformed_id_is_400() {
        let (app, _queue) = test_app();
        let (status, body) = json_response(&app, get_request("/status/nodelimiter")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_simulate_missing_required_field_is_client_error() {
        let (app, _queue) = test_app();
        let body = json!({ "timespan": { "start": 0.0, "end": 90.0 } });
        let response = app.oneshot(post_json("/simulate", &body)).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_synchronous_submit_settles_before_returning() {
        let (app, queue) = test_app();
        let (status, body) = json_response(
            &app,
            post_json("/simulate?synchronous=true&timeout_secs=5", &simulate_body()),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = JobId::parse(body["simulation_id"].as_str().unwrap()).unwrap();
        assert!(queue.status(&id).await.unwrap().is_settled());
    }
}
