//! # Simulation Engine Seam
//!
//! The engine is opaque to this service: it receives a fully resolved
//! [`EngineInvocation`] and returns result files. Each invocation variant
//! mirrors one operation's engine signature, so a handler that builds the
//! wrong argument set fails at compile time rather than inside the
//! engine.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use simq_artifacts::{ProgressSink, ProgressUpdate};
use simq_core::JobId;
use simq_interventions::ResolvedInterventions;
use thiserror::Error;

use crate::requests::{Dataset, OperationKind};

/// A fully resolved engine call, one variant per operation.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineInvocation {
    /// Forward simulation.
    Simulate {
        /// Model configuration to simulate.
        model_config_id: String,
        /// Window start.
        start_time: f64,
        /// Window end.
        end_time: f64,
        /// Output logging step size.
        logging_step_size: f64,
        /// Sample trajectories.
        num_samples: u32,
        /// Resolved intervention overrides.
        interventions: ResolvedInterventions,
        /// Calibration whose posterior seeds the run, if any.
        inferred_parameters: Option<String>,
    },
    /// Calibration.
    Calibrate {
        /// Model configuration to calibrate.
        model_config_id: String,
        /// Dataset to calibrate against.
        dataset: Dataset,
        /// Optional window start.
        start_time: Option<f64>,
        /// Optional window end.
        end_time: Option<f64>,
        /// Sample trajectories.
        num_samples: u32,
        /// Optimizer iterations.
        num_iterations: u32,
        /// Optimizer learning rate.
        lr: f64,
        /// Verbose engine output.
        verbose: bool,
        /// Particles for the variational fit.
        num_particles: u32,
        /// ODE solver method.
        solver_method: String,
        /// Resolved intervention overrides.
        interventions: ResolvedInterventions,
    },
    /// Ensemble forward simulation.
    EnsembleSimulate {
        /// Member configuration ids, order matching `weights`.
        model_config_ids: Vec<String>,
        /// Member weights.
        weights: Vec<f64>,
        /// Member output → shared variable mappings.
        solution_mappings: Vec<BTreeMap<String, String>>,
        /// Window start.
        start_time: f64,
        /// Window end.
        end_time: f64,
        /// Sample trajectories.
        num_samples: u32,
    },
    /// Ensemble calibration.
    EnsembleCalibrate {
        /// Member configuration ids, order matching `weights`.
        model_config_ids: Vec<String>,
        /// Member weights.
        weights: Vec<f64>,
        /// Member output → shared variable mappings.
        solution_mappings: Vec<BTreeMap<String, String>>,
        /// Dataset to calibrate against.
        dataset: Dataset,
        /// Window start.
        start_time: f64,
        /// Window end.
        end_time: f64,
        /// Sample trajectories.
        num_samples: u32,
    },
    /// Intervention-policy optimization.
    Optimize {
        /// Model configuration to optimize over.
        model_config_id: String,
        /// Window start.
        start_time: f64,
        /// Window end.
        end_time: f64,
        /// Quantities of interest.
        qoi: Vec<String>,
        /// Risk bound on the quantities of interest.
        risk_bound: f64,
        /// Initial guess for intervention values.
        initial_guess: Vec<f64>,
        /// Bounds for intervention values.
        bounds: Vec<Vec<f64>>,
        /// Sample trajectories.
        num_samples: u32,
        /// Optimizer iteration cap.
        maxiter: u32,
        /// Optimizer function-evaluation cap.
        maxfeval: u32,
        /// Whether the objective is minimized.
        is_minimized: bool,
        /// Resolved intervention overrides.
        interventions: ResolvedInterventions,
    },
}

impl EngineInvocation {
    /// The operation kind this invocation belongs to.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Simulate { .. } => OperationKind::Simulate,
            Self::Calibrate { .. } => OperationKind::Calibrate,
            Self::EnsembleSimulate { .. } => OperationKind::EnsembleSimulate,
            Self::EnsembleCalibrate { .. } => OperationKind::EnsembleCalibrate,
            Self::Optimize { .. } => OperationKind::Optimize,
        }
    }
}

/// What an engine run produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    /// Files written by the engine, to be attached to the record.
    pub result_files: Vec<String>,
    /// Engine-specific summary payload.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Error from an engine run.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The engine failed. The summary becomes the job's error info.
    #[error("simulation engine failure: {0}")]
    Failure(String),
}

/// The opaque simulation engine.
#[async_trait]
pub trait SimulationEngine: Send + Sync {
    /// Execute one invocation, reporting progress through the sink.
    async fn run(
        &self,
        job_id: &JobId,
        invocation: EngineInvocation,
        progress: &dyn ProgressSink,
    ) -> Result<SimulationOutput, EngineError>;
}

/// Engine used in standalone mode: reports progress and fabricates a
/// result file without doing numerical work.
#[derive(Debug, Default)]
pub struct StubEngine;

#[async_trait]
impl SimulationEngine for StubEngine {
    async fn run(
        &self,
        job_id: &JobId,
        invocation: EngineInvocation,
        progress: &dyn ProgressSink,
    ) -> Result<SimulationOutput, EngineError> {
        simq_artifacts::progress::publish_best_effort(
            progress,
            &ProgressUpdate {
                job_id: job_id.clone(),
                progress: 1.0,
                loss: None,
                current_results: None,
            },
        )
        .await;

        Ok(SimulationOutput {
            result_files: vec![format!("{}-{}.csv", invocation.kind(), job_id)],
            data: serde_json::json!({ "operation": invocation.kind().as_str() }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use simq_artifacts::BufferSink;

    #[allow(dead_code)]
    fn assert_object_safe(_engine: &dyn SimulationEngine) {}

    #[tokio::test]
    async fn test_stub_engine_reports_progress_and_output() {
        let sink = BufferSink::new();
        let id = JobId::generate("ciemss").unwrap();
        let invocation = EngineInvocation::Simulate {
            model_config_id: "mc-1".to_string(),
            start_time: 0.0,
            end_time: 10.0,
            logging_step_size: 1.0,
            num_samples: 100,
            interventions: ResolvedInterventions::default(),
            inferred_parameters: None,
        };

        let output = StubEngine.run(&id, invocation, &sink).await.unwrap();
        assert_eq!(output.result_files.len(), 1);
        assert!(output.result_files[0].starts_with("simulate-"));

        let updates = sink.updates();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].progress, 1.0);
    }

    #[test]
    fn test_invocation_kind() {
        let invocation = EngineInvocation::EnsembleSimulate {
            model_config_ids: vec![],
            weights: vec![],
            solution_mappings: vec![],
            start_time: 0.0,
            end_time: 1.0,
            num_samples: 1,
        };
        assert_eq!(invocation.kind(), OperationKind::EnsembleSimulate);
    }
}
