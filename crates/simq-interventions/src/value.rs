//! # Value Resolver
//!
//! Maps one intervention entry's (value, value_type) pair onto a concrete
//! number, consulting the model configuration for percentage entries.

use crate::error::ResolutionError;
use crate::model_map::ModelConfigMap;
use crate::policy::ValueType;

/// Resolve an intervention value against the model configuration.
///
/// Absolute values pass through untouched. Percentage values scale the
/// target's base value: `base * value / 100`.
///
/// # Errors
///
/// - [`ResolutionError::TargetNotFound`] if a percentage entry names a
///   target absent from the model configuration.
/// - [`ResolutionError::DistributionConfig`] if the target's distribution
///   cannot yield a base value.
pub fn resolve_value(
    applied_to: &str,
    value: f64,
    value_type: ValueType,
    model_map: &ModelConfigMap,
) -> Result<f64, ResolutionError> {
    match value_type {
        ValueType::Absolute => Ok(value),
        ValueType::Percentage => {
            let semantic = model_map
                .get(applied_to)
                .ok_or_else(|| ResolutionError::TargetNotFound {
                    target: applied_to.to_string(),
                })?;
            let base = semantic.base_value(applied_to)?;
            Ok(base * value / 100.0)
        }
    }
}
