use dialog_learn::{FeatureMap, FeatureVector, SparseVector};
use serde::{Deserialize, Serialize};

use super::{DenseField, FeatureItem, Field, SetField};
use crate::lexicon::Lexica;
use crate::state::State;

/// Separates the parts of a conjunction in its feature key.
pub const JOINER: &str = "_";

/// An ordered list of feature descriptors and the vocabulary they map into.
///
/// Every conjunction and every set-valued item is its own feature type, so
/// equal strings produced by different entries never share an index. Dense
/// items produce one value each, in order; values that cannot be resolved
/// are `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureTemplate {
    conjunctions: Vec<Vec<FeatureItem<Field>>>,
    sets: Vec<FeatureItem<SetField>>,
    dense: Vec<FeatureItem<DenseField>>,
    map: FeatureMap,
}

impl FeatureTemplate {
    /// An empty template whose keys are admitted after more than `cutoff`
    /// occurrences.
    pub fn new(cutoff: usize) -> Self {
        Self {
            conjunctions: Vec::new(),
            sets: Vec::new(),
            dense: Vec::new(),
            map: FeatureMap::new(cutoff),
        }
    }

    /// Adds a single-item feature.
    pub fn add(&mut self, item: FeatureItem<Field>) -> &mut Self {
        self.conjunctions.push(vec![item]);
        self
    }

    /// Adds a conjunction of items read as one compound key.
    pub fn add_conjunction(&mut self, items: impl IntoIterator<Item = FeatureItem<Field>>) -> &mut Self {
        self.conjunctions.push(items.into_iter().collect());
        self
    }

    /// Adds a set-valued feature.
    pub fn add_set(&mut self, item: FeatureItem<SetField>) -> &mut Self {
        self.sets.push(item);
        self
    }

    /// Adds a numeric feature.
    pub fn add_dense(&mut self, item: FeatureItem<DenseField>) -> &mut Self {
        self.dense.push(item);
        self
    }

    /// Number of categorical feature types.
    pub fn feature_types(&self) -> usize {
        self.conjunctions.len() + self.sets.len()
    }

    /// Number of numeric features.
    pub fn dense_size(&self) -> usize {
        self.dense.len()
    }

    /// The feature vocabulary.
    pub fn feature_map(&self) -> &FeatureMap {
        &self.map
    }

    /// Drops occurrence counts of keys that never passed the cutoff.
    pub fn clear_counts(&mut self) {
        self.map.clear_counts();
    }

    /// Resolves every categorical entry to `(feature type, key)` pairs.
    pub fn keys<S: State>(&self, state: &S, lexica: &Lexica) -> Vec<(usize, String)> {
        let mut keys = Vec::new();

        for (kind, conjunction) in self.conjunctions.iter().enumerate() {
            let parts: Option<Vec<String>> = conjunction
                .iter()
                .map(|item| state.resolve(item, lexica))
                .collect();
            if let Some(parts) = parts {
                keys.push((kind, parts.join(JOINER)));
            }
        }

        let offset = self.conjunctions.len();
        for (kind, item) in self.sets.iter().enumerate() {
            for value in state.resolve_set(item, lexica) {
                keys.push((offset + kind, value));
            }
        }

        keys
    }

    /// Maps the categorical features of `state` to a sparse vector. While
    /// `training`, unseen keys are counted and allocated past the cutoff.
    pub fn create_sparse_vector<S: State>(
        &mut self,
        state: &S,
        training: bool,
        lexica: &Lexica,
    ) -> SparseVector {
        let keys = self.keys(state, lexica);
        keys.iter()
            .filter_map(|(kind, key)| self.map.lookup(*kind, key, training))
            .map(|index| (index, 1.0))
            .collect()
    }

    /// Like [`FeatureTemplate::create_sparse_vector`] with a frozen
    /// vocabulary.
    pub fn sparse_vector<S: State>(&self, state: &S, lexica: &Lexica) -> SparseVector {
        self.keys(state, lexica)
            .iter()
            .filter_map(|(kind, key)| self.map.index(*kind, key))
            .map(|index| (index, 1.0))
            .collect()
    }

    /// Resolves the numeric features of `state`.
    pub fn create_dense_vector<S: State>(&self, state: &S, lexica: &Lexica) -> Vec<f32> {
        self.dense
            .iter()
            .map(|item| state.numeric(item, lexica).unwrap_or(0.0))
            .collect()
    }

    /// Builds the full input of one classification step.
    pub fn create_feature_vector<S: State>(
        &mut self,
        state: &S,
        training: bool,
        lexica: &Lexica,
    ) -> FeatureVector {
        let sparse = self.create_sparse_vector(state, training, lexica);
        self.attach_dense(sparse, state, lexica)
    }

    /// Builds the full input of one classification step with a frozen
    /// vocabulary.
    pub fn feature_vector<S: State>(&self, state: &S, lexica: &Lexica) -> FeatureVector {
        let sparse = self.sparse_vector(state, lexica);
        self.attach_dense(sparse, state, lexica)
    }

    fn attach_dense<S: State>(&self, sparse: SparseVector, state: &S, lexica: &Lexica) -> FeatureVector {
        if self.dense.is_empty() {
            FeatureVector::sparse(sparse)
        } else {
            FeatureVector::mixed(sparse, self.create_dense_vector(state, lexica))
        }
    }
}
