use std::{fmt, sync::Arc};

use hexzero_engine::BoardEncoding;

use crate::PolicyError;

/// Read-only handle to a policy shared across boards and rounds.
///
/// A loaded policy is never mutated while games are in flight; anything that
/// needs interior state (caches, counters) must synchronize internally.
pub type SharedPolicy = Arc<dyn Policy>;

/// A move-selection policy.
///
/// The core treats policies as opaque: a batch of encoded boards goes in,
/// one probability distribution over cells per board comes out, in input
/// order. Illegal cells must carry effectively zero mass — the driver
/// renormalizes over legal cells but never re-masks a distribution that puts
/// real weight on an owned cell.
///
/// Move-probability-only, probability-plus-value, and uniform-random policy
/// shapes all live behind this one trait; callers depend on nothing but
/// [`Policy::evaluate`].
pub trait Policy: fmt::Debug + Send + Sync {
    fn evaluate(&self, batch: &[BoardEncoding]) -> Result<Vec<MoveDistribution>, PolicyError>;
}

/// Per-board policy output: a probability for every cell in row-major order,
/// optionally paired with a scalar value estimate of the position.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveDistribution {
    probabilities: Vec<f32>,
    value: Option<f32>,
}

impl MoveDistribution {
    #[must_use]
    pub fn new(probabilities: Vec<f32>) -> Self {
        Self {
            probabilities,
            value: None,
        }
    }

    #[must_use]
    pub fn with_value(probabilities: Vec<f32>, value: f32) -> Self {
        Self {
            probabilities,
            value: Some(value),
        }
    }

    /// All probability mass on a single cell.
    #[must_use]
    pub fn one_hot(cell_count: usize, index: usize) -> Self {
        let mut probabilities = vec![0.0; cell_count];
        probabilities[index] = 1.0;
        Self::new(probabilities)
    }

    #[must_use]
    pub fn probabilities(&self) -> &[f32] {
        &self.probabilities
    }

    /// Probability mass assigned to the cell at `index`.
    #[must_use]
    pub fn probability(&self, index: usize) -> f32 {
        self.probabilities[index]
    }

    #[must_use]
    pub fn value(&self) -> Option<f32> {
        self.value
    }
}
