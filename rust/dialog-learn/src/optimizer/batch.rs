use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{Block, LearnError, RegularizedDualAveraging, WeightVector};

use super::{apply, EPSILON};

/// Gradients accumulated between two flushes of a mini-batch optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MiniBatch {
    diagonals: WeightVector,
    gradients: WeightVector,
    updated: BTreeSet<(Block, usize)>,
    steps: u64,
}

impl Default for MiniBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl MiniBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self {
            diagonals: WeightVector::new(),
            gradients: WeightVector::new(),
            updated: BTreeSet::new(),
            steps: 1,
        }
    }

    /// The accumulated squared gradients.
    pub fn diagonals(&self) -> &WeightVector {
        &self.diagonals
    }

    /// One more than the number of flushes so far, empty ones included.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// `true` when gradients are waiting for a flush.
    pub fn is_pending(&self) -> bool {
        !self.updated.is_empty()
    }

    pub(super) fn expand(
        &mut self,
        labels: usize,
        sparse_features: usize,
        dense_features: usize,
    ) -> Result<(), LearnError> {
        self.diagonals.expand(labels, sparse_features, dense_features)?;
        self.gradients.expand(labels, sparse_features, dense_features)?;
        Ok(())
    }

    pub(super) fn accumulate(&mut self, block: Block, index: usize, gradient: f32) {
        self.gradients.block_mut(block).add(index, gradient);
        self.updated.insert((block, index));
    }

    /// Applies every pending gradient in ascending `(block, index)` order.
    ///
    /// `accumulate` maps the previous diagonal and the batch gradient to the
    /// new diagonal.
    pub(super) fn flush<F>(
        &mut self,
        weights: &mut WeightVector,
        regularizer: &mut Option<RegularizedDualAveraging>,
        learning_rate: f32,
        accumulate: F,
    ) where
        F: Fn(f32, f32) -> f32,
    {
        if self.updated.is_empty() {
            self.steps += 1;
            return;
        }

        trace!(indices = self.updated.len(), steps = self.steps, "flushing mini-batch");

        for &(block, index) in &self.updated {
            let gradient = self.gradients.block(block).get(index);
            let diagonals = self.diagonals.block_mut(block);
            let diagonal = accumulate(diagonals.get(index), gradient);
            diagonals.set(index, diagonal);

            let rate = learning_rate / (EPSILON + diagonal.sqrt());
            apply(weights, regularizer, block, index, gradient, rate, self.steps);
            self.gradients.block_mut(block).set(index, 0.0);
        }

        self.updated.clear();
        self.steps += 1;
    }
}
