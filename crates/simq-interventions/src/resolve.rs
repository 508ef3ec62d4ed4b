//! # Intervention Resolver
//!
//! Walks an intervention policy in order and produces the four override
//! collections a simulation engine consumes: static parameter overrides,
//! static state overrides, dynamic parameter overrides, and dynamic state
//! overrides. The partition follows the intervention's declared type
//! only; target names are never inspected.
//!
//! Static overrides from different interventions landing on the same
//! (timestep, target) cell follow last-write-wins in policy order.
//! Dynamic entries each produce their own [`ThresholdTrigger`]; entries
//! sharing a comparator variable are never merged.

use std::collections::BTreeMap;

use crate::error::ResolutionError;
use crate::model_map::ModelConfigMap;
use crate::policy::{InterventionPolicy, InterventionType};
use crate::value::resolve_value;

/// A simulation timestep usable as an ordered map key.
///
/// Wraps `f64` with a total order (`f64::total_cmp`) so fractional
/// timesteps can key a `BTreeMap` deterministically.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timestep(f64);

impl Timestep {
    /// Wrap a raw timestep value.
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    /// The raw timestep value.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Eq for Timestep {}

impl PartialOrd for Timestep {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Timestep {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for Timestep {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl From<f64> for Timestep {
    fn from(value: f64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for Timestep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The firing condition of one dynamic override.
///
/// Each dynamic entry owns exactly one trigger; two entries watching the
/// same comparator variable still get distinct triggers. The crossing
/// test lives here, in [`ThresholdTrigger::margin`], so every dynamic
/// override is evaluated identically.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTrigger {
    /// The parameter or state variable the override applies to.
    pub target: String,
    /// The state variable monitored for the crossing.
    pub comparator_variable: String,
    /// The threshold against which the comparator is measured.
    pub threshold: f64,
}

impl ThresholdTrigger {
    /// Signed distance of the comparator variable from the threshold.
    ///
    /// Non-negative means the threshold has been reached. Returns `None`
    /// when the comparator variable is absent from the observed state.
    pub fn margin(&self, state: &BTreeMap<String, f64>) -> Option<f64> {
        state
            .get(&self.comparator_variable)
            .map(|observed| observed - self.threshold)
    }

    /// Whether the threshold has been reached in the observed state.
    pub fn fires(&self, state: &BTreeMap<String, f64>) -> bool {
        self.margin(state).is_some_and(|m| m >= 0.0)
    }
}

/// One resolved dynamic override: a trigger plus the value to apply.
#[derive(Debug, Clone, PartialEq)]
pub struct DynamicOverride {
    /// When the override fires.
    pub trigger: ThresholdTrigger,
    /// The concrete value applied when it fires.
    pub value: f64,
}

/// Timestep → target → resolved value.
pub type StaticOverrides = BTreeMap<Timestep, BTreeMap<String, f64>>;

/// The four override collections produced by [`resolve`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedInterventions {
    /// Static overrides for model parameters.
    pub static_parameters: StaticOverrides,
    /// Static overrides for state variables.
    pub static_states: StaticOverrides,
    /// Dynamic overrides for model parameters.
    pub dynamic_parameters: Vec<DynamicOverride>,
    /// Dynamic overrides for state variables.
    pub dynamic_states: Vec<DynamicOverride>,
}

impl ResolvedInterventions {
    /// Whether no overrides were produced.
    pub fn is_empty(&self) -> bool {
        self.static_parameters.is_empty()
            && self.static_states.is_empty()
            && self.dynamic_parameters.is_empty()
            && self.dynamic_states.is_empty()
    }
}

/// Resolve an intervention policy against a model configuration.
///
/// An absent policy resolves to four empty collections. Interventions
/// are processed in policy order; any value resolution failure aborts
/// the whole resolution.
pub fn resolve(
    policy: Option<&InterventionPolicy>,
    model_map: &ModelConfigMap,
) -> Result<ResolvedInterventions, ResolutionError> {
    let mut resolved = ResolvedInterventions::default();
    let Some(policy) = policy else {
        return Ok(resolved);
    };

    for intervention in &policy.interventions {
        let (static_map, dynamic_list) = match intervention.intervention_type {
            InterventionType::Parameter => {
                (&mut resolved.static_parameters, &mut resolved.dynamic_parameters)
            }
            InterventionType::State => {
                (&mut resolved.static_states, &mut resolved.dynamic_states)
            }
        };

        for entry in &intervention.static_interventions {
            let value =
                resolve_value(&intervention.applied_to, entry.value, entry.value_type, model_map)?;
            static_map
                .entry(Timestep::new(entry.timestep))
                .or_default()
                .insert(intervention.applied_to.clone(), value);
        }

        for entry in &intervention.dynamic_interventions {
            let value =
                resolve_value(&intervention.applied_to, entry.value, entry.value_type, model_map)?;
            dynamic_list.push(DynamicOverride {
                trigger: ThresholdTrigger {
                    target: intervention.applied_to.clone(),
                    comparator_variable: entry.comparator_variable.clone(),
                    threshold: entry.threshold,
                },
                value,
            });
        }
    }

    Ok(resolved)
}
