//! Sparse and mixed feature vectors.

use serde::{Deserialize, Serialize};

/// One active feature: an index into the feature space and its value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SparseItem {
    /// Feature index.
    pub index: usize,
    /// Feature value; categorical features use `1.0`.
    pub value: f32,
}

impl SparseItem {
    /// Creates an item.
    pub fn new(index: usize, value: f32) -> Self {
        Self { index, value }
    }
}

/// An ordered collection of [`SparseItem`]s with unique indices.
///
/// Iteration follows insertion order. Adding an index that is already
/// present accumulates into the existing item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    items: Vec<SparseItem>,
}

impl SparseVector {
    /// Creates an empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` at `index`.
    pub fn add(&mut self, index: usize, value: f32) {
        match self.items.iter_mut().find(|item| item.index == index) {
            Some(item) => item.value += value,
            None => self.items.push(SparseItem::new(index, value)),
        }
    }

    /// Adds a categorical feature (value `1.0`).
    pub fn add_index(&mut self, index: usize) {
        self.add(index, 1.0);
    }

    /// The active items in insertion order.
    pub fn items(&self) -> &[SparseItem] {
        &self.items
    }

    /// Iterates the active items.
    pub fn iter(&self) -> impl Iterator<Item = &SparseItem> {
        self.items.iter()
    }

    /// Number of active items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` when no feature is active.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The largest active index, if any.
    pub fn max_index(&self) -> Option<usize> {
        self.items.iter().map(|item| item.index).max()
    }
}

impl FromIterator<(usize, f32)> for SparseVector {
    fn from_iter<I: IntoIterator<Item = (usize, f32)>>(iter: I) -> Self {
        let mut vector = SparseVector::new();
        for (index, value) in iter {
            vector.add(index, value);
        }
        vector
    }
}

/// The full input of one classification step: categorical features and an
/// optional fixed-arity block of numeric features.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Categorical features mapped through a feature map.
    pub sparse: SparseVector,
    /// Numeric features; absent values are `0.0`.
    pub dense: Option<Vec<f32>>,
}

impl FeatureVector {
    /// Creates a vector with only sparse features.
    pub fn sparse(sparse: SparseVector) -> Self {
        Self {
            sparse,
            dense: None,
        }
    }

    /// Creates a vector with sparse and dense features.
    pub fn mixed(sparse: SparseVector, dense: Vec<f32>) -> Self {
        Self {
            sparse,
            dense: Some(dense),
        }
    }

    /// Number of dense features.
    pub fn dense_size(&self) -> usize {
        self.dense.as_ref().map_or(0, Vec::len)
    }

    /// `true` when neither part carries any feature.
    pub fn is_empty(&self) -> bool {
        self.sparse.is_empty() && self.dense_size() == 0
    }
}
