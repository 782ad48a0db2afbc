//! A growable label × feature matrix stored in one flat buffer.
//!
//! ## Layouts
//!
//! - [`Layout::RowMajor`] keeps each label's weights contiguous
//!   (`label * features + feature`). Dense inputs, where every label reads
//!   every feature, scan it one row at a time.
//! - [`Layout::ColumnMajor`] keeps each feature's weights contiguous
//!   (`label + feature * labels`). Sparse inputs touch a handful of features,
//!   so scoring visits one short column per active feature.
//!
//! Both layouts accumulate each label's score in feature order, so they
//! produce bit-identical scores for the same weights and input.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::{LearnError, SparseItem};

/// Physical ordering of a [`MajorVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Layout {
    /// Label-major stride.
    RowMajor,
    /// Feature-major stride.
    ColumnMajor,
}

/// A dense `labels × features` weight matrix in one of two layouts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MajorVector {
    layout: Layout,
    labels: usize,
    features: usize,
    weights: Vec<f32>,
}

impl MajorVector {
    /// Creates an empty matrix.
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            labels: 0,
            features: 0,
            weights: Vec::new(),
        }
    }

    /// Creates a zero matrix of the given shape.
    pub fn with_size(layout: Layout, labels: usize, features: usize) -> Self {
        Self {
            layout,
            labels,
            features,
            weights: vec![0.0; labels * features],
        }
    }

    /// The physical layout.
    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Number of labels (rows).
    pub fn label_size(&self) -> usize {
        self.labels
    }

    /// Number of features (columns).
    pub fn feature_size(&self) -> usize {
        self.features
    }

    /// Total number of weights.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    /// `true` when the matrix has no cells.
    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Flat index of `(label, feature)`.
    pub fn index_of(&self, label: usize, feature: usize) -> usize {
        Self::flat(self.layout, self.labels, self.features, label, feature)
    }

    fn flat(layout: Layout, labels: usize, features: usize, label: usize, feature: usize) -> usize {
        match layout {
            Layout::RowMajor => label * features + feature,
            Layout::ColumnMajor => label + feature * labels,
        }
    }

    /// Weight at a flat index.
    pub fn get(&self, index: usize) -> f32 {
        self.weights[index]
    }

    /// Overwrites the weight at a flat index.
    pub fn set(&mut self, index: usize, value: f32) {
        self.weights[index] = value;
    }

    /// Adds `delta` to the weight at a flat index.
    pub fn add(&mut self, index: usize, delta: f32) {
        self.weights[index] += delta;
    }

    /// Sets every weight to zero without changing the shape.
    pub fn fill_zero(&mut self) {
        self.weights.iter_mut().for_each(|w| *w = 0.0);
    }

    /// The flat buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.weights
    }

    /// Grows the matrix to `labels × features`, keeping every existing
    /// weight at its `(label, feature)` coordinate.
    ///
    /// Returns `Ok(false)` when the shape is unchanged.
    pub fn expand(&mut self, labels: usize, features: usize) -> Result<bool, LearnError> {
        if labels < self.labels || features < self.features {
            return Err(LearnError::Shrink {
                labels: self.labels,
                features: self.features,
                new_labels: labels,
                new_features: features,
            });
        }

        if labels == self.labels && features == self.features {
            return Ok(false);
        }

        let mut weights = vec![0.0; labels * features];

        match self.layout {
            Layout::RowMajor => {
                for label in 0..self.labels {
                    let from = label * self.features;
                    let to = label * features;
                    weights[to..to + self.features]
                        .copy_from_slice(&self.weights[from..from + self.features]);
                }
            }
            Layout::ColumnMajor => {
                for feature in 0..self.features {
                    let from = feature * self.labels;
                    let to = feature * labels;
                    weights[to..to + self.labels]
                        .copy_from_slice(&self.weights[from..from + self.labels]);
                }
            }
        }

        trace!(
            from_labels = self.labels,
            from_features = self.features,
            labels,
            features,
            "expanded weight matrix"
        );

        self.labels = labels;
        self.features = features;
        self.weights = weights;
        Ok(true)
    }

    /// Adds `w[label] · x` to `scores[label]` for every label.
    ///
    /// Items whose index lies beyond the current feature size contribute
    /// nothing.
    pub fn add_scores_sparse(&self, x: &[SparseItem], scores: &mut [f32]) {
        let labels = self.labels.min(scores.len());

        match self.layout {
            Layout::RowMajor => {
                for (label, score) in scores.iter_mut().enumerate().take(labels) {
                    let row = label * self.features;
                    for item in x.iter().filter(|item| item.index < self.features) {
                        *score += self.weights[row + item.index] * item.value;
                    }
                }
            }
            Layout::ColumnMajor => {
                for item in x.iter().filter(|item| item.index < self.features) {
                    let column = &self.weights[item.index * self.labels..][..labels];
                    for (score, weight) in scores.iter_mut().zip(column) {
                        *score += weight * item.value;
                    }
                }
            }
        }
    }

    /// Adds `w[label] · x` to `scores[label]` for a dense input whose
    /// position `i` is feature `i`.
    pub fn add_scores_dense(&self, x: &[f32], scores: &mut [f32]) {
        let labels = self.labels.min(scores.len());
        let features = self.features.min(x.len());

        match self.layout {
            Layout::RowMajor => {
                for (label, score) in scores.iter_mut().enumerate().take(labels) {
                    let row = &self.weights[label * self.features..][..features];
                    for (weight, value) in row.iter().zip(x) {
                        *score += weight * value;
                    }
                }
            }
            Layout::ColumnMajor => {
                for (feature, value) in x.iter().enumerate().take(features) {
                    let column = &self.weights[feature * self.labels..][..labels];
                    for (score, weight) in scores.iter_mut().zip(column) {
                        *score += weight * value;
                    }
                }
            }
        }
    }

    /// Number of weights that are not exactly zero.
    pub fn count_non_zero(&self) -> usize {
        self.weights.iter().filter(|w| **w != 0.0).count()
    }
}
