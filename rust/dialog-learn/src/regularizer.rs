//! L1 regularization by regularized dual averaging.

use serde::{Deserialize, Serialize};

use crate::{Block, LearnError, WeightVector};

/// Keeps the running sum of every gradient applied to an index and derives
/// the weight from it by soft-thresholding.
///
/// With `λ = rate * steps`, a weight is exactly zero while the accumulated
/// gradient stays within `[-λ, λ]`; otherwise it is
/// `learning_rate * (sum - sign(sum) * λ)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegularizedDualAveraging {
    rate: f32,
    gradients: WeightVector,
}

impl RegularizedDualAveraging {
    /// Creates a regularizer with strength `rate`.
    pub fn new(rate: f32) -> Result<Self, LearnError> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(LearnError::InvalidHyperParameter {
                name: "l1_regularization",
                value: rate.to_string(),
            });
        }

        Ok(Self {
            rate,
            gradients: WeightVector::new(),
        })
    }

    /// The regularization strength.
    pub fn rate(&self) -> f32 {
        self.rate
    }

    /// Grows the accumulator alongside the weights.
    pub fn expand(
        &mut self,
        labels: usize,
        sparse_features: usize,
        dense_features: usize,
    ) -> Result<bool, LearnError> {
        self.gradients.expand(labels, sparse_features, dense_features)
    }

    /// Accumulates `gradient` at `index` and writes the projected weight.
    pub fn update(
        &mut self,
        weights: &mut WeightVector,
        block: Block,
        index: usize,
        gradient: f32,
        learning_rate: f32,
        steps: u64,
    ) {
        let cumulative = self.gradients.block_mut(block);
        cumulative.add(index, gradient);
        let value = project(cumulative.get(index), self.rate * steps as f32, learning_rate);
        weights.block_mut(block).set(index, value);
    }
}

/// Soft-thresholds an accumulated gradient.
pub fn project(cumulative: f32, l1: f32, learning_rate: f32) -> f32 {
    if cumulative.abs() <= l1 {
        0.0
    } else {
        learning_rate * (cumulative - cumulative.signum() * l1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_accumulations_project_to_zero() {
        assert_eq!(project(0.5, 1.0, 0.1), 0.0);
        assert_eq!(project(-1.0, 1.0, 0.1), 0.0);
        assert_eq!(project(3.0, 1.0, 0.5), 1.0);
        assert_eq!(project(-3.0, 1.0, 0.5), -1.0);
    }

    #[test]
    fn negative_strength_is_rejected() {
        assert!(RegularizedDualAveraging::new(-0.1).is_err());
        assert!(RegularizedDualAveraging::new(0.0).is_ok());
    }
}
