//! # Intervention Policy Data Model
//!
//! The declarative policy shape as stored in the artifact store: an
//! ordered list of interventions, each targeting one parameter or state
//! variable with static (timestep-keyed) and dynamic (threshold-keyed)
//! entries.
//!
//! Policy order matters. Entries later in the list overwrite earlier
//! entries that land on the same (timestep, target) cell.

use serde::{Deserialize, Serialize};

/// How an entry's `value` field is interpreted during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// The value is used verbatim.
    Absolute,
    /// The value is a percentage of the target's base value in the
    /// model configuration.
    Percentage,
}

/// Whether an intervention overrides a model parameter or a state variable.
///
/// The declared type decides which resolved map the override lands in;
/// the resolver never infers it from the target name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionType {
    /// Overrides a model parameter.
    Parameter,
    /// Overrides a state variable.
    State,
}

/// A static intervention entry: apply a value at a fixed timestep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaticEntry {
    /// Simulation timestep at which the override applies.
    pub timestep: f64,
    /// The override value (interpreted per `value_type`).
    pub value: f64,
    /// How `value` is interpreted.
    #[serde(default = "default_value_type")]
    pub value_type: ValueType,
}

/// A dynamic intervention entry: apply a value when a monitored variable
/// crosses a threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicEntry {
    /// Threshold against which the comparator variable is measured.
    pub threshold: f64,
    /// The override value (interpreted per `value_type`).
    pub value: f64,
    /// How `value` is interpreted.
    #[serde(default = "default_value_type")]
    pub value_type: ValueType,
    /// The state variable monitored for the threshold crossing.
    pub comparator_variable: String,
}

fn default_value_type() -> ValueType {
    ValueType::Absolute
}

/// One intervention: a target plus its static and dynamic entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Intervention {
    /// Human-readable name.
    pub name: String,
    /// The parameter or state variable this intervention overrides.
    pub applied_to: String,
    /// Whether `applied_to` is a parameter or a state variable.
    #[serde(rename = "type")]
    pub intervention_type: InterventionType,
    /// Timestep-keyed entries.
    #[serde(default)]
    pub static_interventions: Vec<StaticEntry>,
    /// Threshold-keyed entries.
    #[serde(default)]
    pub dynamic_interventions: Vec<DynamicEntry>,
}

/// An ordered intervention policy, as stored in the artifact store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterventionPolicy {
    /// Policy identifier in the artifact store, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// The interventions, in application order.
    #[serde(default)]
    pub interventions: Vec<Intervention>,
}
