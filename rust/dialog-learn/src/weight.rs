//! The model's weights: one matrix for sparse features, one for dense.

use serde::{Deserialize, Serialize};

use crate::{FeatureVector, Layout, LearnError, MajorVector, SparseItem};

/// Which matrix of a [`WeightVector`] a flat index belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Block {
    /// The column-major matrix of categorical features.
    Sparse,
    /// The row-major matrix of numeric features.
    Dense,
}

/// Label × feature weights for both kinds of features.
///
/// Adaptive optimizers keep their accumulators in additional
/// `WeightVector`s of the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
    sparse: MajorVector,
    dense: MajorVector,
}

impl Default for WeightVector {
    fn default() -> Self {
        Self::new()
    }
}

impl WeightVector {
    /// Creates an empty weight vector.
    pub fn new() -> Self {
        Self {
            sparse: MajorVector::new(Layout::ColumnMajor),
            dense: MajorVector::new(Layout::RowMajor),
        }
    }

    /// Creates a zero weight vector shaped like `other`.
    pub fn shaped_like(other: &WeightVector) -> Self {
        Self {
            sparse: MajorVector::with_size(
                Layout::ColumnMajor,
                other.sparse.label_size(),
                other.sparse.feature_size(),
            ),
            dense: MajorVector::with_size(
                Layout::RowMajor,
                other.dense.label_size(),
                other.dense.feature_size(),
            ),
        }
    }

    /// The matrix for `block`.
    pub fn block(&self, block: Block) -> &MajorVector {
        match block {
            Block::Sparse => &self.sparse,
            Block::Dense => &self.dense,
        }
    }

    /// The mutable matrix for `block`.
    pub fn block_mut(&mut self, block: Block) -> &mut MajorVector {
        match block {
            Block::Sparse => &mut self.sparse,
            Block::Dense => &mut self.dense,
        }
    }

    /// Number of labels.
    pub fn label_size(&self) -> usize {
        self.sparse.label_size()
    }

    /// Number of sparse features.
    pub fn sparse_feature_size(&self) -> usize {
        self.sparse.feature_size()
    }

    /// Number of dense features.
    pub fn dense_feature_size(&self) -> usize {
        self.dense.feature_size()
    }

    /// Grows both matrices, never shrinking either.
    pub fn expand(
        &mut self,
        labels: usize,
        sparse_features: usize,
        dense_features: usize,
    ) -> Result<bool, LearnError> {
        let sparse = self.sparse.expand(labels, sparse_features)?;
        let dense = self.dense.expand(labels, dense_features)?;
        Ok(sparse || dense)
    }

    /// Adds the scores of `bias` and `x` into `scores`.
    pub fn add_scores(&self, bias: Option<SparseItem>, x: &FeatureVector, scores: &mut [f32]) {
        if let Some(bias) = bias {
            self.sparse.add_scores_sparse(&[bias], scores);
        }
        self.sparse.add_scores_sparse(x.sparse.items(), scores);
        if let Some(dense) = &x.dense {
            self.dense.add_scores_dense(dense, scores);
        }
    }

    /// Number of weights that are not exactly zero.
    pub fn count_non_zero(&self) -> usize {
        self.sparse.count_non_zero() + self.dense.count_non_zero()
    }
}
