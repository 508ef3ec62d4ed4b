//! # Typed Operation Requests
//!
//! The request payloads accepted at the submission boundary, one struct
//! per operation. Validation happens at deserialization: an unknown
//! operation tag or a missing required field never reaches the queue.
//!
//! [`OperationRequest`] is also the queue payload: the worker
//! deserializes it back and rebuilds the engine invocation through the
//! registry, so the queue never carries anything untyped beyond JSON.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::JobError;

/// The closed set of operations the service executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OperationKind {
    /// Forward simulation from a single model configuration.
    Simulate,
    /// Parameter calibration against a dataset.
    Calibrate,
    /// Forward simulation over an ensemble of model configurations.
    EnsembleSimulate,
    /// Calibration of an ensemble against a dataset.
    EnsembleCalibrate,
    /// Intervention-policy optimization under a risk bound.
    Optimize,
}

impl OperationKind {
    /// Every operation the service knows, in registry order.
    pub const ALL: [OperationKind; 5] = [
        Self::Simulate,
        Self::Calibrate,
        Self::EnsembleSimulate,
        Self::EnsembleCalibrate,
        Self::Optimize,
    ];

    /// Return the wire name of this operation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Simulate => "simulate",
            Self::Calibrate => "calibrate",
            Self::EnsembleSimulate => "ensemble-simulate",
            Self::EnsembleCalibrate => "ensemble-calibrate",
            Self::Optimize => "optimize",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = JobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simulate" => Ok(Self::Simulate),
            "calibrate" => Ok(Self::Calibrate),
            "ensemble-simulate" => Ok(Self::EnsembleSimulate),
            "ensemble-calibrate" => Ok(Self::EnsembleCalibrate),
            "optimize" => Ok(Self::Optimize),
            other => Err(JobError::UnknownOperation(other.to_string())),
        }
    }
}

/// Simulated time window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Timespan {
    /// Start of the window.
    pub start: f64,
    /// End of the window.
    pub end: f64,
}

/// A dataset reference for calibration operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Dataset id in the artifact store.
    pub id: String,
    /// File within the dataset to calibrate against.
    pub filename: String,
    /// Dataset column → model variable mappings.
    #[serde(default)]
    pub mappings: BTreeMap<String, String>,
}

/// One member of an ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleModelConfig {
    /// Model configuration id.
    pub id: String,
    /// Model output → shared solution variable mappings.
    #[serde(default)]
    pub solution_mappings: BTreeMap<String, String>,
    /// Relative weight of this member.
    pub weight: f64,
}

fn default_num_samples() -> u32 {
    100
}

fn default_step_size() -> f64 {
    1.0
}

fn default_num_iterations() -> u32 {
    1000
}

fn default_lr() -> f64 {
    0.03
}

fn default_num_particles() -> u32 {
    1
}

fn default_solver_method() -> String {
    "dopri5".to_string()
}

fn default_maxiter() -> u32 {
    5
}

fn default_maxfeval() -> u32 {
    25
}

fn default_true() -> bool {
    true
}

/// Request body for `simulate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulateRequest {
    /// The model configuration to simulate.
    pub model_config_id: String,
    /// Simulated time window.
    pub timespan: Timespan,
    /// Intervention policy to apply, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    /// Output logging step size.
    #[serde(default = "default_step_size")]
    pub step_size: f64,
    /// Number of sample trajectories.
    #[serde(default = "default_num_samples")]
    pub num_samples: u32,
    /// Calibration whose posterior seeds the simulation, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inferred_parameters: Option<String>,
}

/// Request body for `calibrate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalibrateRequest {
    /// The model configuration to calibrate.
    pub model_config_id: String,
    /// The dataset to calibrate against.
    pub dataset: Dataset,
    /// Optional simulated time window.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timespan: Option<Timespan>,
    /// Intervention policy to apply during calibration, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    /// Number of sample trajectories.
    #[serde(default = "default_num_samples")]
    pub num_samples: u32,
    /// Optimizer iterations.
    #[serde(default = "default_num_iterations")]
    pub num_iterations: u32,
    /// Optimizer learning rate.
    #[serde(default = "default_lr")]
    pub lr: f64,
    /// Verbose engine output.
    #[serde(default)]
    pub verbose: bool,
    /// Particles for the variational fit.
    #[serde(default = "default_num_particles")]
    pub num_particles: u32,
    /// ODE solver method.
    #[serde(default = "default_solver_method")]
    pub solver_method: String,
}

/// Request body for `ensemble-simulate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleSimulateRequest {
    /// The ensemble members.
    pub model_configs: Vec<EnsembleModelConfig>,
    /// Simulated time window.
    pub timespan: Timespan,
    /// Number of sample trajectories.
    #[serde(default = "default_num_samples")]
    pub num_samples: u32,
}

/// Request body for `ensemble-calibrate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleCalibrateRequest {
    /// The ensemble members.
    pub model_configs: Vec<EnsembleModelConfig>,
    /// The dataset to calibrate against.
    pub dataset: Dataset,
    /// Simulated time window.
    pub timespan: Timespan,
    /// Number of sample trajectories.
    #[serde(default = "default_num_samples")]
    pub num_samples: u32,
}

/// Request body for `optimize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizeRequest {
    /// The model configuration to optimize over.
    pub model_config_id: String,
    /// Simulated time window.
    pub timespan: Timespan,
    /// Intervention policy whose values are optimized.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    /// Quantities of interest constrained by the risk bound.
    pub qoi: Vec<String>,
    /// Risk bound on the quantities of interest.
    pub risk_bound: f64,
    /// Initial guess for the intervention values.
    #[serde(default)]
    pub initial_guess_interventions: Vec<f64>,
    /// Bounds for the intervention values.
    #[serde(default)]
    pub bounds_interventions: Vec<Vec<f64>>,
    /// Number of sample trajectories.
    #[serde(default = "default_num_samples")]
    pub num_samples: u32,
    /// Optimizer iteration cap.
    #[serde(default = "default_maxiter")]
    pub maxiter: u32,
    /// Optimizer function-evaluation cap.
    #[serde(default = "default_maxfeval")]
    pub maxfeval: u32,
    /// Whether the objective is minimized.
    #[serde(default = "default_true")]
    pub is_minimized: bool,
}

/// A submitted operation request, tagged by operation name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "kebab-case")]
pub enum OperationRequest {
    /// Forward simulation.
    Simulate(SimulateRequest),
    /// Calibration.
    Calibrate(CalibrateRequest),
    /// Ensemble forward simulation.
    EnsembleSimulate(EnsembleSimulateRequest),
    /// Ensemble calibration.
    EnsembleCalibrate(EnsembleCalibrateRequest),
    /// Optimization.
    Optimize(OptimizeRequest),
}

impl OperationRequest {
    /// The operation kind this request carries.
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Simulate(_) => OperationKind::Simulate,
            Self::Calibrate(_) => OperationKind::Calibrate,
            Self::EnsembleSimulate(_) => OperationKind::EnsembleSimulate,
            Self::EnsembleCalibrate(_) => OperationKind::EnsembleCalibrate,
            Self::Optimize(_) => OperationKind::Optimize,
        }
    }

    /// The intervention policy id, for operations that accept one.
    pub fn policy_id(&self) -> Option<&str> {
        match self {
            Self::Simulate(r) => r.policy_id.as_deref(),
            Self::Calibrate(r) => r.policy_id.as_deref(),
            Self::Optimize(r) => r.policy_id.as_deref(),
            Self::EnsembleSimulate(_) | Self::EnsembleCalibrate(_) => None,
        }
    }

    /// The single model configuration id, for non-ensemble operations.
    pub fn primary_model_config(&self) -> Option<&str> {
        match self {
            Self::Simulate(r) => Some(&r.model_config_id),
            Self::Calibrate(r) => Some(&r.model_config_id),
            Self::Optimize(r) => Some(&r.model_config_id),
            Self::EnsembleSimulate(_) | Self::EnsembleCalibrate(_) => None,
        }
    }
}
