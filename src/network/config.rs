//! Configuration for the answer network.
//!
//! All parameters have defaults matching the reference behavior and can be
//! overridden from the `network` section of `config.yaml`.

use serde::{Deserialize, Serialize};

use crate::error::{NetworkError, Result};

/// Most decimal places `weight_precision` may request; an `f64` carries no
/// more than this many significant decimal digits.
pub const MAX_WEIGHT_PRECISION: u32 = 15;

/// What to do with a hidden node reachable through more than one edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep one hidden-layer entry per stored edge (reference behavior).
    /// A node linked from two question words occupies two hidden slots.
    #[default]
    Preserve,
    /// Keep the first occurrence of each node only
    Deduplicate,
}

/// How setup fetches the two weight matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WeightFetch {
    /// One point lookup at a time, rows outer, columns inner
    #[default]
    Sequential,
    /// All point lookups of a matrix in flight at once
    Concurrent,
    /// One bulk query per matrix
    Batched,
}

/// Configuration for hidden-node creation and network setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Hidden-layer duplicate handling (see [`DuplicatePolicy`]).
    pub duplicate_policy: DuplicatePolicy,

    /// Weight-matrix fetch strategy. Does not change results.
    pub weight_fetch: WeightFetch,

    /// Strength given to every answer → hidden edge when a node is generated.
    pub answer_prior: f64,

    /// Decimal places kept for the initial word → hidden strength `1 / |words|`.
    pub weight_precision: u32,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Preserve,
            weight_fetch: WeightFetch::Sequential,
            answer_prior: 0.1,
            weight_precision: 7,
        }
    }
}

impl NetworkConfig {
    /// Reject settings that would seed non-finite strengths.
    pub fn validate(&self) -> Result<()> {
        if self.weight_precision > MAX_WEIGHT_PRECISION {
            return Err(NetworkError::precondition(format!(
                "weight_precision must be at most {} (got {})",
                MAX_WEIGHT_PRECISION, self.weight_precision
            )));
        }
        if !self.answer_prior.is_finite() {
            return Err(NetworkError::precondition(format!(
                "answer_prior must be finite (got {})",
                self.answer_prior
            )));
        }
        Ok(())
    }
}
