//! # Operation Registry
//!
//! The closed mapping from [`OperationKind`] to the handler that turns a
//! typed request plus resolved interventions into an [`EngineInvocation`].
//! Handlers are plain function pointers registered at construction; the
//! set of operations is fixed at compile time and a lookup can only find
//! what [`OperationRegistry::standard`] put there.
//!
//! Each handler destructures exactly its own request variant, so a
//! mis-wired registry surfaces as [`JobError::OperationMismatch`] instead
//! of an engine call with the wrong arguments.

use std::collections::BTreeMap;

use simq_interventions::ResolvedInterventions;

use crate::engine::EngineInvocation;
use crate::error::JobError;
use crate::requests::{OperationKind, OperationRequest};

/// Builds an engine invocation from a request of the handler's kind.
pub type HandlerFn =
    fn(&OperationRequest, ResolvedInterventions) -> Result<EngineInvocation, JobError>;

/// The operation → handler table.
#[derive(Debug, Clone)]
pub struct OperationRegistry {
    handlers: BTreeMap<OperationKind, HandlerFn>,
}

impl OperationRegistry {
    /// The standard registry covering every [`OperationKind`].
    pub fn standard() -> Self {
        let mut handlers: BTreeMap<OperationKind, HandlerFn> = BTreeMap::new();
        handlers.insert(OperationKind::Simulate, build_simulate as HandlerFn);
        handlers.insert(OperationKind::Calibrate, build_calibrate as HandlerFn);
        handlers.insert(
            OperationKind::EnsembleSimulate,
            build_ensemble_simulate as HandlerFn,
        );
        handlers.insert(
            OperationKind::EnsembleCalibrate,
            build_ensemble_calibrate as HandlerFn,
        );
        handlers.insert(OperationKind::Optimize, build_optimize as HandlerFn);
        Self { handlers }
    }

    /// Look up the handler for an operation.
    pub fn handler(&self, kind: OperationKind) -> Result<HandlerFn, JobError> {
        self.handlers
            .get(&kind)
            .copied()
            .ok_or_else(|| JobError::UnknownOperation(kind.as_str().to_string()))
    }

    /// The kinds with a registered handler.
    pub fn kinds(&self) -> impl Iterator<Item = OperationKind> + '_ {
        self.handlers.keys().copied()
    }
}

impl Default for OperationRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

fn mismatch(expected: OperationKind, request: &OperationRequest) -> JobError {
    JobError::OperationMismatch {
        expected,
        actual: request.kind(),
    }
}

fn build_simulate(
    request: &OperationRequest,
    interventions: ResolvedInterventions,
) -> Result<EngineInvocation, JobError> {
    let OperationRequest::Simulate(r) = request else {
        return Err(mismatch(OperationKind::Simulate, request));
    };
    Ok(EngineInvocation::Simulate {
        model_config_id: r.model_config_id.clone(),
        start_time: r.timespan.start,
        end_time: r.timespan.end,
        logging_step_size: r.step_size,
        num_samples: r.num_samples,
        interventions,
        inferred_parameters: r.inferred_parameters.clone(),
    })
}

fn build_calibrate(
    request: &OperationRequest,
    interventions: ResolvedInterventions,
) -> Result<EngineInvocation, JobError> {
    let OperationRequest::Calibrate(r) = request else {
        return Err(mismatch(OperationKind::Calibrate, request));
    };
    Ok(EngineInvocation::Calibrate {
        model_config_id: r.model_config_id.clone(),
        dataset: r.dataset.clone(),
        start_time: r.timespan.map(|t| t.start),
        end_time: r.timespan.map(|t| t.end),
        num_samples: r.num_samples,
        num_iterations: r.num_iterations,
        lr: r.lr,
        verbose: r.verbose,
        num_particles: r.num_particles,
        solver_method: r.solver_method.clone(),
        interventions,
    })
}

fn build_ensemble_simulate(
    request: &OperationRequest,
    _interventions: ResolvedInterventions,
) -> Result<EngineInvocation, JobError> {
    let OperationRequest::EnsembleSimulate(r) = request else {
        return Err(mismatch(OperationKind::EnsembleSimulate, request));
    };
    Ok(EngineInvocation::EnsembleSimulate {
        model_config_ids: r.model_configs.iter().map(|m| m.id.clone()).collect(),
        weights: r.model_configs.iter().map(|m| m.weight).collect(),
        solution_mappings: r
            .model_configs
            .iter()
            .map(|m| m.solution_mappings.clone())
            .collect(),
        start_time: r.timespan.start,
        end_time: r.timespan.end,
        num_samples: r.num_samples,
    })
}

fn build_ensemble_calibrate(
    request: &OperationRequest,
    _interventions: ResolvedInterventions,
) -> Result<EngineInvocation, JobError> {
    let OperationRequest::EnsembleCalibrate(r) = request else {
        return Err(mismatch(OperationKind::EnsembleCalibrate, request));
    };
    Ok(EngineInvocation::EnsembleCalibrate {
        model_config_ids: r.model_configs.iter().map(|m| m.id.clone()).collect(),
        weights: r.model_configs.iter().map(|m| m.weight).collect(),
        solution_mappings: r
            .model_configs
            .iter()
            .map(|m| m.solution_mappings.clone())
            .collect(),
        dataset: r.dataset.clone(),
        start_time: r.timespan.start,
        end_time: r.timespan.end,
        num_samples: r.num_samples,
    })
}

fn build_optimize(
    request: &OperationRequest,
    interventions: ResolvedInterventions,
) -> Result<EngineInvocation, JobError> {
    let OperationRequest::Optimize(r) = request else {
        return Err(mismatch(OperationKind::Optimize, request));
    };
    Ok(EngineInvocation::Optimize {
        model_config_id: r.model_config_id.clone(),
        start_time: r.timespan.start,
        end_time: r.timespan.end,
        qoi: r.qoi.clone(),
        risk_bound: r.risk_bound,
        initial_guess: r.initial_guess_interventions.clone(),
        bounds: r.bounds_interventions.clone(),
        num_samples: r.num_samples,
        maxiter: r.maxiter,
        maxfeval: r.maxfeval,
        is_minimized: r.is_minimized,
        interventions,
    })
}
