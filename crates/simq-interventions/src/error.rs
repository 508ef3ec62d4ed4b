//! Errors raised while resolving an intervention policy.
//!
//! Both variants are hard failures: a policy that names a missing target
//! or a malformed distribution must fail the job, not degrade to a
//! default value.

use thiserror::Error;

/// Error resolving an intervention value against a model configuration.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolutionError {
    /// A percentage intervention named a target absent from the model
    /// configuration.
    #[error("intervention target {target:?} not found in model configuration")]
    TargetNotFound {
        /// The missing target name.
        target: String,
    },

    /// The target's distribution lacks the fields needed to derive a
    /// base value.
    #[error("cannot derive base value for {target:?}: {reason}")]
    DistributionConfig {
        /// The target whose distribution is malformed.
        target: String,
        /// What was missing or malformed.
        reason: String,
    },
}
