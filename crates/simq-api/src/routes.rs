//! # HTTP Routes
//!
//! One submission route per operation, plus status and cancel lookups:
//!
//! - POST /simulate
//! - POST /calibrate
//! - POST /ensemble-simulate
//! - POST /ensemble-calibrate
//! - POST /optimize
//! - GET  /status/{simulation_id}
//! - GET  /cancel/{simulation_id}
//!
//! Submission routes share one query-parameter surface ([`SubmitParams`])
//! and differ only in the typed request body they accept. Handlers hold
//! no logic of their own; they translate HTTP into gatekeeper and
//! reconciler calls.

use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use simq_core::JobId;
use simq_jobs::{
    CalibrateRequest, EnsembleCalibrateRequest, EnsembleSimulateRequest, JobState,
    OperationRequest, OptimizeRequest, SimulateRequest, SubmitOptions, SubmitReceipt,
    DEFAULT_ENGINE,
};

use crate::error::AppError;
use crate::state::AppState;

/// Query parameters accepted by every submission route.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubmitParams {
    /// Engine prefix for generated job ids.
    #[serde(default)]
    pub engine: Option<String>,
    /// Purge any live queue entry under the id before enqueueing.
    #[serde(default)]
    pub force_restart: bool,
    /// Block the request until the job settles or the timeout passes.
    #[serde(default)]
    pub synchronous: bool,
    /// Upper bound on the synchronous wait, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Resubmit under an existing job id instead of generating one.
    #[serde(default)]
    pub simulation_id: Option<String>,
}

fn default_timeout_secs() -> u64 {
    60
}

impl SubmitParams {
    fn into_options(self) -> Result<SubmitOptions, AppError> {
        let job_id = match self.simulation_id {
            Some(raw) => Some(JobId::parse(&raw)?),
            None => None,
        };
        Ok(SubmitOptions {
            engine: self.engine.unwrap_or_else(|| DEFAULT_ENGINE.to_string()),
            force_restart: self.force_restart,
            synchronous: self.synchronous,
            timeout: Duration::from_secs(self.timeout_secs),
            job_id,
        })
    }
}

async fn submit(
    state: AppState,
    params: SubmitParams,
    request: OperationRequest,
) -> Result<(StatusCode, Json<SubmitReceipt>), AppError> {
    let options = params.into_options()?;
    let receipt = state.gatekeeper.submit(request, options).await?;
    Ok((StatusCode::CREATED, Json(receipt)))
}

/// POST /simulate
pub async fn simulate(
    State(state): State<AppState>,
    Query(params): Query<SubmitParams>,
    Json(body): Json<SimulateRequest>,
) -> Result<(StatusCode, Json<SubmitReceipt>), AppError> {
    submit(state, params, OperationRequest::Simulate(body)).await
}

/// POST /calibrate
pub async fn calibrate(
    State(state): State<AppState>,
    Query(params): Query<SubmitParams>,
    Json(body): Json<CalibrateRequest>,
) -> Result<(StatusCode, Json<SubmitReceipt>), AppError> {
    submit(state, params, OperationRequest::Calibrate(body)).await
}

/// POST /ensemble-simulate
pub async fn ensemble_simulate(
    State(state): State<AppState>,
    Query(params): Query<SubmitParams>,
    Json(body): Json<EnsembleSimulateRequest>,
) -> Result<(StatusCode, Json<SubmitReceipt>), AppError> {
    submit(state, params, OperationRequest::EnsembleSimulate(body)).await
}

/// POST /ensemble-calibrate
pub async fn ensemble_calibrate(
    State(state): State<AppState>,
    Query(params): Query<SubmitParams>,
    Json(body): Json<EnsembleCalibrateRequest>,
) -> Result<(StatusCode, Json<SubmitReceipt>), AppError> {
    submit(state, params, OperationRequest::EnsembleCalibrate(body)).await
}

/// POST /optimize
pub async fn optimize(
    State(state): State<AppState>,
    Query(params): Query<SubmitParams>,
    Json(body): Json<OptimizeRequest>,
) -> Result<(StatusCode, Json<SubmitReceipt>), AppError> {
    submit(state, params, OperationRequest::Optimize(body)).await
}

/// GET /status/{simulation_id}
pub async fn status(
    State(state): State<AppState>,
    Path(simulation_id): Path<String>,
) -> Result<Json<JobState>, AppError> {
    let job_id = JobId::parse(&simulation_id)?;
    let job_state = state.reconciler.fetch_status(&job_id).await?;
    Ok(Json(job_state))
}

/// GET /cancel/{simulation_id}
pub async fn cancel(
    State(state): State<AppState>,
    Path(simulation_id): Path<String>,
) -> Result<Json<JobState>, AppError> {
    let job_id = JobId::parse(&simulation_id)?;
    let job_state = state.reconciler.cancel(&job_id).await?;
    Ok(Json(job_state))
}
