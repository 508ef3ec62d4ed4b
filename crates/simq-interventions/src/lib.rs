//! # simq-interventions — Intervention Policy Resolution
//!
//! Converts a declarative intervention policy into the concrete override
//! maps a simulation engine consumes:
//!
//! - **static** overrides, keyed by timestep then target, partitioned into
//!   parameter and state maps by the intervention's declared type;
//! - **dynamic** overrides, each carrying a [`ThresholdTrigger`] predicate
//!   that fires when a monitored variable crosses a threshold.
//!
//! Values are resolved against the model configuration: absolute values
//! pass through, percentage values scale the target's base value. Base
//! values come from a literal, a uniform distribution's midpoint, or an
//! inferred distribution's mean. Lookup and distribution-shape failures
//! are hard errors, never silent defaults.

pub mod error;
pub mod model_map;
pub mod policy;
pub mod resolve;
pub mod value;

pub use error::ResolutionError;
pub use model_map::{DistributionKind, DistributionSpec, ModelConfigMap, Semantic};
pub use policy::{DynamicEntry, Intervention, InterventionPolicy, InterventionType, StaticEntry, ValueType};
pub use resolve::{resolve, DynamicOverride, ResolvedInterventions, StaticOverrides, ThresholdTrigger, Timestep};
pub use value::resolve_value;
