//! The partial dependency tree a state builds while decoding.

use serde::{Deserialize, Serialize};

/// A head and the relation that links a dependent to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyArc {
    /// Head id (`0` is the root).
    pub head: usize,
    /// Dependency relation.
    pub label: String,
}

impl DependencyArc {
    /// Creates an arc.
    pub fn new(head: usize, label: impl Into<String>) -> Self {
        Self {
            head,
            label: label.into(),
        }
    }
}

/// Heads and dependents of every node, root included.
///
/// A node's head is set at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    arcs: Vec<Option<DependencyArc>>,
    dependents: Vec<Vec<usize>>,
}

impl Graph {
    /// A graph of `len` nodes without arcs.
    pub fn new(len: usize) -> Self {
        Self {
            arcs: vec![None; len],
            dependents: vec![Vec::new(); len],
        }
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// `true` when the graph has no nodes.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Arcs indexed by dependent id.
    pub fn arcs(&self) -> &[Option<DependencyArc>] {
        &self.arcs
    }

    /// The arc to `id`'s head.
    pub fn arc(&self, id: usize) -> Option<&DependencyArc> {
        self.arcs.get(id)?.as_ref()
    }

    /// `id`'s head.
    pub fn head(&self, id: usize) -> Option<usize> {
        self.arc(id).map(|arc| arc.head)
    }

    /// `id`'s relation to its head.
    pub fn label(&self, id: usize) -> Option<&str> {
        self.arc(id).map(|arc| arc.label.as_str())
    }

    /// `true` once `id` has a head.
    pub fn has_head(&self, id: usize) -> bool {
        self.arc(id).is_some()
    }

    /// Attaches `dependent` to `head`. A node that already has a head is
    /// left untouched and `false` is returned.
    pub fn attach(&mut self, dependent: usize, head: usize, label: impl Into<String>) -> bool {
        if self.has_head(dependent) || dependent >= self.len() || head >= self.len() {
            return false;
        }

        self.arcs[dependent] = Some(DependencyArc::new(head, label));
        let siblings = &mut self.dependents[head];
        let position = siblings.partition_point(|id| *id < dependent);
        siblings.insert(position, dependent);
        true
    }

    /// `id`'s head's head.
    pub fn grand_head(&self, id: usize) -> Option<usize> {
        self.head(self.head(id)?)
    }

    /// `id`'s dependents in sentence order.
    pub fn dependents(&self, id: usize) -> &[usize] {
        self.dependents.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    fn split(&self, id: usize) -> (&[usize], &[usize]) {
        let dependents = self.dependents(id);
        dependents.split_at(dependents.partition_point(|d| *d < id))
    }

    /// The `order`-th dependent counted from the far left.
    pub fn leftmost_dependent(&self, id: usize, order: usize) -> Option<usize> {
        self.split(id).0.get(order).copied()
    }

    /// The `order`-th dependent counted from the far right.
    pub fn rightmost_dependent(&self, id: usize, order: usize) -> Option<usize> {
        self.split(id).1.iter().rev().nth(order).copied()
    }

    /// The `order`-th left dependent counted outwards from `id`.
    pub fn left_nearest_dependent(&self, id: usize, order: usize) -> Option<usize> {
        self.split(id).0.iter().rev().nth(order).copied()
    }

    /// The `order`-th right dependent counted outwards from `id`.
    pub fn right_nearest_dependent(&self, id: usize, order: usize) -> Option<usize> {
        self.split(id).1.get(order).copied()
    }

    /// The `order`-th sibling to the left, counted outwards from `id`.
    pub fn left_nearest_sibling(&self, id: usize, order: usize) -> Option<usize> {
        let head = self.head(id)?;
        let siblings = self.dependents(head);
        let position = siblings.partition_point(|s| *s < id);
        siblings[..position].iter().rev().nth(order).copied()
    }

    /// The `order`-th sibling to the right, counted outwards from `id`.
    pub fn right_nearest_sibling(&self, id: usize, order: usize) -> Option<usize> {
        let head = self.head(id)?;
        let siblings = self.dependents(head);
        let position = siblings.partition_point(|s| *s <= id);
        siblings[position..].get(order).copied()
    }

    /// Number of left and right dependents.
    pub fn valency(&self, id: usize) -> (usize, usize) {
        let (left, right) = self.split(id);
        (left.len(), right.len())
    }

    /// `true` when `ancestor` lies on `node`'s path to the root.
    pub fn is_descendant_of(&self, node: usize, ancestor: usize) -> bool {
        let mut current = node;
        for _ in 0..self.len() {
            match self.head(current) {
                Some(head) if head == ancestor => return true,
                Some(head) => current = head,
                None => return false,
            }
        }
        false
    }
}
