//! Online optimizers.
//!
//! An [`OnlineOptimizer`] owns the weights and the label vocabulary of one
//! classifier. Every call to [`OnlineOptimizer::train`] scores an
//! [`Instance`], decides the gold and predicted labels and, when they
//! differ, moves the weights towards the gold label.
//!
//! The update rule is chosen by [`Method`]:
//!
//! - [`Method::Perceptron`]: fixed learning rate, plain argmax.
//! - [`Method::AdaGrad`]: per-weight rates scaled by the accumulated squared
//!   gradient, hinge-loss prediction.
//! - [`Method::AdaGradMiniBatch`] and [`Method::AdaDeltaMiniBatch`]: the
//!   same, with gradients held back until
//!   [`OnlineOptimizer::update_mini_batch`].
//! - [`Method::Softmax`]: multinomial logistic regression updating every
//!   label.

mod batch;

pub use batch::*;

use serde::{Deserialize, Serialize};

use crate::{
    Block, FeatureVector, Instance, LabelMap, LearnError, RegularizedDualAveraging, SparseItem,
    WeightVector, argmax, softmax,
};

/// Keeps adaptive learning rates finite for untouched weights.
pub const EPSILON: f32 = 0.00001;

/// The update strategy of an [`OnlineOptimizer`] and the state it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Method {
    /// Mistake-driven perceptron.
    Perceptron,
    /// AdaGrad applied after every instance.
    AdaGrad {
        /// Accumulated squared gradients.
        diagonals: WeightVector,
    },
    /// AdaGrad applied once per mini-batch.
    AdaGradMiniBatch(MiniBatch),
    /// AdaDelta applied once per mini-batch.
    AdaDeltaMiniBatch {
        /// Pending gradients and decayed squared gradients.
        batch: MiniBatch,
        /// Weight of the previous average.
        decay: f32,
    },
    /// Softmax regression.
    Softmax,
}

impl Method {
    /// A perceptron.
    pub fn perceptron() -> Self {
        Method::Perceptron
    }

    /// Per-instance AdaGrad.
    pub fn ada_grad() -> Self {
        Method::AdaGrad {
            diagonals: WeightVector::new(),
        }
    }

    /// Mini-batch AdaGrad.
    pub fn ada_grad_mini_batch() -> Self {
        Method::AdaGradMiniBatch(MiniBatch::new())
    }

    /// Mini-batch AdaDelta with the given decay.
    pub fn ada_delta_mini_batch(decay: f32) -> Result<Self, LearnError> {
        if !(0.0..=1.0).contains(&decay) {
            return Err(LearnError::InvalidHyperParameter {
                name: "decay",
                value: decay.to_string(),
            });
        }
        Ok(Method::AdaDeltaMiniBatch {
            batch: MiniBatch::new(),
            decay,
        })
    }

    /// Softmax regression.
    pub fn softmax() -> Self {
        Method::Softmax
    }

    /// `true` for the methods that defer updates to a batch flush.
    pub fn is_mini_batch(&self) -> bool {
        matches!(
            self,
            Method::AdaGradMiniBatch(_) | Method::AdaDeltaMiniBatch { .. }
        )
    }

    /// `true` when a mini-batch holds gradients not yet flushed.
    pub fn is_pending(&self) -> bool {
        match self {
            Method::AdaGradMiniBatch(batch) | Method::AdaDeltaMiniBatch { batch, .. } => {
                batch.is_pending()
            }
            Method::Perceptron | Method::AdaGrad { .. } | Method::Softmax => false,
        }
    }

    fn expand(&mut self, labels: usize, sparse: usize, dense: usize) -> Result<(), LearnError> {
        match self {
            Method::AdaGrad { diagonals } => {
                diagonals.expand(labels, sparse, dense)?;
            }
            Method::AdaGradMiniBatch(batch) | Method::AdaDeltaMiniBatch { batch, .. } => {
                batch.expand(labels, sparse, dense)?;
            }
            Method::Perceptron | Method::Softmax => {}
        }
        Ok(())
    }
}

/// A linear classifier trained one instance at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlineOptimizer {
    weights: WeightVector,
    labels: LabelMap,
    bias: f32,
    learning_rate: f32,
    steps: u64,
    regularizer: Option<RegularizedDualAveraging>,
    method: Method,
}

impl OnlineOptimizer {
    /// Creates an optimizer. A positive `bias` adds a constant feature at
    /// index `0`.
    pub fn new(method: Method, learning_rate: f32, bias: f32) -> Result<Self, LearnError> {
        if !learning_rate.is_finite() || learning_rate <= 0.0 {
            return Err(LearnError::InvalidLearningRate(learning_rate));
        }
        if !bias.is_finite() || bias < 0.0 {
            return Err(LearnError::InvalidHyperParameter {
                name: "bias",
                value: bias.to_string(),
            });
        }

        Ok(Self {
            weights: WeightVector::new(),
            labels: LabelMap::new(),
            bias,
            learning_rate,
            steps: 1,
            regularizer: None,
            method,
        })
    }

    /// Adds L1 regularization.
    pub fn with_regularizer(mut self, regularizer: RegularizedDualAveraging) -> Self {
        self.regularizer = Some(regularizer);
        self
    }

    /// The weights.
    pub fn weights(&self) -> &WeightVector {
        &self.weights
    }

    /// The label vocabulary.
    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    /// The label vocabulary, for registering labels before training.
    pub fn labels_mut(&mut self) -> &mut LabelMap {
        &mut self.labels
    }

    /// The update strategy.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The base learning rate.
    pub fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    /// The bias value.
    pub fn bias(&self) -> f32 {
        self.bias
    }

    /// Number of trained instances so far, starting at one.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// The regularizer, if any.
    pub fn regularizer(&self) -> Option<&RegularizedDualAveraging> {
        self.regularizer.as_ref()
    }

    /// Number of weights that are not exactly zero.
    pub fn count_non_zero(&self) -> usize {
        self.weights.count_non_zero()
    }

    fn bias_item(&self) -> Option<SparseItem> {
        (self.bias > 0.0).then(|| SparseItem::new(0, self.bias))
    }

    /// Scores every label of the vocabulary. Labels or features the weights
    /// have not grown to yet score zero.
    pub fn scores(&self, x: &FeatureVector) -> Vec<f32> {
        let mut scores = vec![0.0; self.labels.len().max(self.weights.label_size())];
        self.weights.add_scores(self.bias_item(), x, &mut scores);
        scores
    }

    /// Trains on one instance.
    ///
    /// An empty feature vector leaves the optimizer untouched.
    pub fn train(&mut self, instance: &mut Instance) -> Result<(), LearnError> {
        if instance.features().is_empty() {
            return Ok(());
        }

        let size = self.labels.len();
        if instance.zero_cost_labels().is_empty() {
            return Err(LearnError::EmptyGold);
        }
        if let Some(&label) = instance.zero_cost_labels().iter().find(|label| **label >= size) {
            return Err(LearnError::LabelOutOfRange { label, size });
        }

        self.expand_to(instance.features())?;

        let mut scores = self.scores(instance.features());
        let gold = instance.best_gold(&scores).ok_or(LearnError::EmptyGold)?;
        let predicted = match &self.method {
            Method::Perceptron => argmax(&scores).unwrap_or(gold),
            Method::AdaGrad { .. }
            | Method::AdaGradMiniBatch(_)
            | Method::AdaDeltaMiniBatch { .. } => {
                let mut margins = scores.clone();
                margins[gold] -= 1.0;
                argmax(&margins).unwrap_or(gold)
            }
            Method::Softmax => {
                softmax(&mut scores);
                if scores[gold] >= 1.0 {
                    gold
                } else {
                    argmax(&scores).unwrap_or(gold)
                }
            }
        };

        if !instance.is_gold(predicted) {
            self.update(instance.features(), gold, predicted, &scores);
        }

        instance.record(scores, gold, predicted);
        self.steps += 1;
        Ok(())
    }

    /// Flushes the pending gradients of a mini-batch method. Other methods
    /// ignore the call.
    pub fn update_mini_batch(&mut self) {
        let Self {
            weights,
            regularizer,
            method,
            learning_rate,
            ..
        } = self;

        match method {
            Method::AdaGradMiniBatch(batch) => {
                batch.flush(weights, regularizer, *learning_rate, |previous, gradient| {
                    previous + gradient * gradient
                });
            }
            Method::AdaDeltaMiniBatch { batch, decay } => {
                let decay = *decay;
                batch.flush(weights, regularizer, *learning_rate, |previous, gradient| {
                    decay * previous + (1.0 - decay) * gradient * gradient
                });
            }
            Method::Perceptron | Method::AdaGrad { .. } | Method::Softmax => {}
        }
    }

    fn expand_to(&mut self, x: &FeatureVector) -> Result<(), LearnError> {
        let labels = self.labels.len().max(self.weights.label_size());
        let sparse = x
            .sparse
            .max_index()
            .map_or(1, |index| index + 1)
            .max(self.weights.sparse_feature_size());
        let dense = x.dense_size().max(self.weights.dense_feature_size());

        let remaps = labels != self.weights.label_size()
            || dense != self.weights.dense_feature_size();
        if remaps && self.method.is_pending() {
            self.update_mini_batch();
        }

        if self.weights.expand(labels, sparse, dense)? {
            self.method.expand(labels, sparse, dense)?;
            if let Some(regularizer) = &mut self.regularizer {
                regularizer.expand(labels, sparse, dense)?;
            }
        }
        Ok(())
    }

    /// Flat indices and gradients of every weight touched by moving `gold`
    /// up and `predicted` down.
    fn contrast(&self, x: &FeatureVector, gold: usize, predicted: usize) -> Vec<(Block, usize, f32)> {
        let mut touched = Vec::new();
        for (label, sign) in [(gold, 1.0), (predicted, -1.0)] {
            self.gradients_for(x, label, sign, &mut touched);
        }
        touched
    }

    fn gradients_for(
        &self,
        x: &FeatureVector,
        label: usize,
        scale: f32,
        touched: &mut Vec<(Block, usize, f32)>,
    ) {
        let sparse = self.weights.block(Block::Sparse);
        for item in self.bias_item().iter().chain(x.sparse.iter()) {
            touched.push((Block::Sparse, sparse.index_of(label, item.index), scale * item.value));
        }

        if let Some(values) = &x.dense {
            let dense = self.weights.block(Block::Dense);
            for (feature, value) in values.iter().enumerate() {
                touched.push((Block::Dense, dense.index_of(label, feature), scale * value));
            }
        }
    }

    fn update(&mut self, x: &FeatureVector, gold: usize, predicted: usize, scores: &[f32]) {
        let touched = match &self.method {
            Method::Softmax => {
                let mut touched = Vec::new();
                for (label, probability) in scores.iter().enumerate() {
                    let target = if label == gold { 1.0 } else { 0.0 };
                    self.gradients_for(x, label, target - probability, &mut touched);
                }
                touched
            }
            _ => self.contrast(x, gold, predicted),
        };

        let Self {
            weights,
            regularizer,
            method,
            learning_rate,
            steps,
            ..
        } = self;

        match method {
            Method::Perceptron | Method::Softmax => {
                for (block, index, gradient) in touched {
                    apply(weights, regularizer, block, index, gradient, *learning_rate, *steps);
                }
            }
            Method::AdaGrad { diagonals } => {
                for &(block, index, gradient) in &touched {
                    diagonals.block_mut(block).add(index, gradient * gradient);
                }
                for (block, index, gradient) in touched {
                    let rate = *learning_rate / (EPSILON + diagonals.block(block).get(index).sqrt());
                    apply(weights, regularizer, block, index, gradient, rate, *steps);
                }
            }
            Method::AdaGradMiniBatch(batch) | Method::AdaDeltaMiniBatch { batch, .. } => {
                for (block, index, gradient) in touched {
                    batch.accumulate(block, index, gradient);
                }
            }
        }
    }
}

/// Writes one gradient step, through the regularizer when there is one.
fn apply(
    weights: &mut WeightVector,
    regularizer: &mut Option<RegularizedDualAveraging>,
    block: Block,
    index: usize,
    gradient: f32,
    rate: f32,
    steps: u64,
) {
    match regularizer {
        Some(regularizer) => regularizer.update(weights, block, index, gradient, rate, steps),
        None => weights.block_mut(block).add(index, rate * gradient),
    }
}
