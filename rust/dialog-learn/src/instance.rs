//! One training example.

use crate::{FeatureVector, argmax_of};

/// A feature vector together with every label that is correct for it.
///
/// Transition systems often have several equally good actions; all of them
/// are listed in `gold`. During [`crate::OnlineOptimizer::train`] the
/// optimizer fills in the scores, the gold label it trained towards and the
/// label it predicted.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    features: FeatureVector,
    gold: Vec<usize>,
    scores: Option<Vec<f32>>,
    gold_label: Option<usize>,
    predicted: Option<usize>,
}

impl Instance {
    /// Creates an instance with a set of zero-cost labels.
    pub fn new(features: FeatureVector, gold: Vec<usize>) -> Self {
        Self {
            features,
            gold,
            scores: None,
            gold_label: None,
            predicted: None,
        }
    }

    /// Creates an instance with exactly one correct label.
    pub fn single(features: FeatureVector, gold: usize) -> Self {
        Self::new(features, vec![gold])
    }

    /// The feature vector.
    pub fn features(&self) -> &FeatureVector {
        &self.features
    }

    /// Every zero-cost label.
    pub fn zero_cost_labels(&self) -> &[usize] {
        &self.gold
    }

    /// `true` when `label` is one of the zero-cost labels.
    pub fn is_gold(&self, label: usize) -> bool {
        self.gold.contains(&label)
    }

    /// Scores computed before the update, if the instance was trained.
    pub fn scores(&self) -> Option<&[f32]> {
        self.scores.as_deref()
    }

    /// The label the update trained towards.
    pub fn gold_label(&self) -> Option<usize> {
        self.gold_label
    }

    /// The label the weights predicted before the update.
    pub fn predicted_label(&self) -> Option<usize> {
        self.predicted
    }

    /// Picks the zero-cost label with the highest score, lowest index on
    /// ties.
    pub fn best_gold(&self, scores: &[f32]) -> Option<usize> {
        argmax_of(scores, self.gold.iter().copied())
    }

    pub(crate) fn record(&mut self, scores: Vec<f32>, gold: usize, predicted: usize) {
        self.scores = Some(scores);
        self.gold_label = Some(gold);
        self.predicted = Some(predicted);
    }
}
