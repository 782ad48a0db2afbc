//! String labels mapped to dense indices.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// The label vocabulary of a classifier, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelMap {
    labels: IndexSet<String>,
}

impl LabelMap {
    /// Creates an empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `label`, returning its index. Known labels keep their index.
    pub fn add(&mut self, label: &str) -> usize {
        match self.labels.get_index_of(label) {
            Some(index) => index,
            None => self.labels.insert_full(label.to_string()).0,
        }
    }

    /// Index of `label`, if known.
    pub fn index(&self, label: &str) -> Option<usize> {
        self.labels.get_index_of(label)
    }

    /// Label at `index`, if in range.
    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get_index(index).map(String::as_str)
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// `true` when no label is known.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Labels in index order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl<S: AsRef<str>> FromIterator<S> for LabelMap {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut map = LabelMap::new();
        for label in iter {
            map.add(label.as_ref());
        }
        map
    }
}
