//! # Model Configuration Map
//!
//! The slice of a model configuration the resolver needs: a map from
//! target name (parameter or initial-state name) to its semantic, which
//! is either a literal value or a distribution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ResolutionError;

/// Distribution families a model configuration may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistributionKind {
    /// Uniform over [minimum, maximum]; base value is the midpoint.
    Uniform,
    /// Posterior from a prior calibration; base value is the mean.
    Inferred,
}

/// A distribution declaration. Which fields must be present depends on
/// the kind; absence is a [`ResolutionError::DistributionConfig`] at
/// resolution time, not deserialization time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSpec {
    /// The distribution family.
    pub kind: DistributionKind,
    /// Lower bound (uniform).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Upper bound (uniform).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Mean (inferred).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
}

/// The semantic attached to a target in the model configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Semantic {
    /// A literal value, e.g. `{"value": 100}`.
    Value {
        /// The literal.
        value: f64,
    },
    /// A distribution declaration.
    Distribution(DistributionSpec),
}

impl Semantic {
    /// Derive the base value a percentage intervention scales against.
    ///
    /// # Errors
    ///
    /// [`ResolutionError::DistributionConfig`] if a uniform distribution
    /// is missing a bound or an inferred distribution is missing its mean.
    pub fn base_value(&self, target: &str) -> Result<f64, ResolutionError> {
        match self {
            Self::Value { value } => Ok(*value),
            Self::Distribution(spec) => match spec.kind {
                DistributionKind::Uniform => match (spec.minimum, spec.maximum) {
                    (Some(min), Some(max)) => Ok((min + max) / 2.0),
                    _ => Err(ResolutionError::DistributionConfig {
                        target: target.to_string(),
                        reason: "uniform distribution requires minimum and maximum".to_string(),
                    }),
                },
                DistributionKind::Inferred => {
                    spec.mean.ok_or_else(|| ResolutionError::DistributionConfig {
                        target: target.to_string(),
                        reason: "inferred distribution requires a mean".to_string(),
                    })
                }
            },
        }
    }
}

/// Target name → semantic, extracted from a model configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelConfigMap(BTreeMap<String, Semantic>);

impl ModelConfigMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a target's semantic.
    pub fn get(&self, target: &str) -> Option<&Semantic> {
        self.0.get(target)
    }

    /// Insert a semantic for a target.
    pub fn insert(&mut self, target: impl Into<String>, semantic: Semantic) {
        self.0.insert(target.into(), semantic);
    }

    /// Number of targets in the map.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Semantic)> for ModelConfigMap {
    fn from_iter<I: IntoIterator<Item = (String, Semantic)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
