//! Categorical feature vocabularies.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Maps `(feature type, value)` keys to feature indices.
///
/// Each feature type has its own key space, so the same string produced by
/// two different templates never collides. Index `0` is reserved for the
/// bias; allocated indices start at `1` and are shared across types.
///
/// While training, keys are counted and only receive an index once they have
/// been seen more than `cutoff` times. Frozen lookups never allocate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureMap {
    cutoff: usize,
    size: usize,
    indices: Vec<IndexMap<String, usize>>,
    counts: Vec<IndexMap<String, usize>>,
}

impl Default for FeatureMap {
    fn default() -> Self {
        Self::new(0)
    }
}

impl FeatureMap {
    /// Creates an empty map admitting keys seen more than `cutoff` times.
    pub fn new(cutoff: usize) -> Self {
        Self {
            cutoff,
            size: 1,
            indices: Vec::new(),
            counts: Vec::new(),
        }
    }

    /// The count threshold.
    pub fn cutoff(&self) -> usize {
        self.cutoff
    }

    /// One past the largest allocated index.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of allocated keys.
    pub fn len(&self) -> usize {
        self.size - 1
    }

    /// `true` when no key has been allocated.
    pub fn is_empty(&self) -> bool {
        self.size == 1
    }

    /// Frozen lookup.
    pub fn index(&self, kind: usize, key: &str) -> Option<usize> {
        self.indices.get(kind)?.get(key).copied()
    }

    /// Counts one occurrence of `key` and returns its index once it passes
    /// the cutoff.
    pub fn add(&mut self, kind: usize, key: &str) -> Option<usize> {
        if let Some(index) = self.index(kind, key) {
            return Some(index);
        }

        if self.indices.len() <= kind {
            self.indices.resize_with(kind + 1, IndexMap::new);
            self.counts.resize_with(kind + 1, IndexMap::new);
        }

        let count = self.counts[kind].entry(key.to_string()).or_insert(0);
        *count += 1;
        if *count <= self.cutoff {
            return None;
        }

        self.counts[kind].swap_remove(key);
        let index = self.size;
        self.indices[kind].insert(key.to_string(), index);
        self.size += 1;
        Some(index)
    }

    /// Looks `key` up, allocating it when `training`.
    pub fn lookup(&mut self, kind: usize, key: &str, training: bool) -> Option<usize> {
        if training {
            self.add(kind, key)
        } else {
            self.index(kind, key)
        }
    }

    /// Drops the occurrence counts of keys that never passed the cutoff.
    pub fn clear_counts(&mut self) {
        self.counts.iter_mut().for_each(IndexMap::clear);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_start_after_the_bias() {
        let mut map = FeatureMap::new(0);
        assert_eq!(map.add(0, "the"), Some(1));
        assert_eq!(map.add(1, "the"), Some(2));
        assert_eq!(map.add(0, "the"), Some(1));
        assert_eq!(map.size(), 3);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn keys_wait_for_the_cutoff() {
        let mut map = FeatureMap::new(2);
        assert_eq!(map.add(0, "rare"), None);
        assert_eq!(map.add(0, "rare"), None);
        assert_eq!(map.add(0, "rare"), Some(1));
        assert_eq!(map.index(0, "rare"), Some(1));
    }

    #[test]
    fn frozen_lookups_never_allocate() {
        let mut map = FeatureMap::new(0);
        assert_eq!(map.lookup(0, "unseen", false), None);
        assert!(map.is_empty());
        assert_eq!(map.lookup(0, "seen", true), Some(1));
        assert_eq!(map.lookup(0, "seen", false), Some(1));
    }
}
