//! Legal transitions per structural configuration, computed once per label
//! vocabulary.

use dialog_learn::LabelMap;
use serde::{Deserialize, Serialize};

use crate::error::NlpError;
use crate::transition::{ArcMove, ListMove, TransitionLabel, transition_labels};

/// The structural situation of the stack top `s` and the input `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// `s` is the root and `i` has no head.
    RootShift,
    /// `s` is the root and `i` already has a head.
    RootShiftNoArc,
    /// Any arc would form a cycle or give a node a second head.
    NoArc,
    /// `i` descends from a headless `s`; `s` must stay on the stack.
    NoArcKeepStack,
    /// Neither node has a head.
    Unattached,
    /// `s` has no head, `i` has one.
    UnattachedInputHeaded,
    /// `s` has a head, `i` has none.
    Open,
}

impl Category {
    /// Every category.
    pub const ALL: [Category; 7] = [
        Category::RootShift,
        Category::RootShiftNoArc,
        Category::NoArc,
        Category::NoArcKeepStack,
        Category::Unattached,
        Category::UnattachedInputHeaded,
        Category::Open,
    ];

    fn name(self) -> &'static str {
        match self {
            Category::RootShift => "root shift",
            Category::RootShiftNoArc => "root shift without arc",
            Category::NoArc => "no arc",
            Category::NoArcKeepStack => "no arc keeping the stack",
            Category::Unattached => "unattached",
            Category::UnattachedInputHeaded => "unattached with headed input",
            Category::Open => "open",
        }
    }

    fn admits(self, label: &TransitionLabel) -> bool {
        use ArcMove::*;
        use ListMove::*;

        match self {
            Category::RootShift => matches!((label.arc, label.list), (Right | NoArc, Shift)),
            Category::RootShiftNoArc => matches!((label.arc, label.list), (NoArc, Shift)),
            Category::NoArc => label.arc == NoArc,
            Category::NoArcKeepStack => matches!((label.arc, label.list), (NoArc, Shift | Pass)),
            Category::Unattached => !matches!((label.arc, label.list), (NoArc, Reduce)),
            Category::UnattachedInputHeaded => {
                label.arc == Left || matches!((label.arc, label.list), (NoArc, Shift | Pass))
            }
            Category::Open => label.arc != Left,
        }
    }
}

/// Parsed transition labels with, for every [`Category`], the indices of
/// the labels legal in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelCandidateIndex {
    labels: LabelMap,
    transitions: Vec<TransitionLabel>,
    categories: Vec<Vec<usize>>,
    left_arcs: Vec<usize>,
    right_arcs: Vec<usize>,
}

impl LabelCandidateIndex {
    /// Parses every label of `labels` and groups them by category.
    pub fn new(labels: LabelMap) -> Result<Self, NlpError> {
        let transitions = labels
            .iter()
            .map(str::parse)
            .collect::<Result<Vec<TransitionLabel>, _>>()?;

        let mut categories = Vec::with_capacity(Category::ALL.len());
        for category in Category::ALL {
            let indices: Vec<usize> = transitions
                .iter()
                .enumerate()
                .filter(|(_, label)| category.admits(label))
                .map(|(index, _)| index)
                .collect();
            if indices.is_empty() {
                return Err(NlpError::EmptyCategory(category.name()));
            }
            categories.push(indices);
        }

        let by_arc = |arc: ArcMove| -> Vec<usize> {
            transitions
                .iter()
                .enumerate()
                .filter(|(_, label)| label.arc == arc)
                .map(|(index, _)| index)
                .collect()
        };
        let left_arcs = by_arc(ArcMove::Left);
        let right_arcs = by_arc(ArcMove::Right);

        Ok(Self {
            labels,
            transitions,
            categories,
            left_arcs,
            right_arcs,
        })
    }

    /// Builds the vocabulary of [`transition_labels`] for `deprels`.
    pub fn from_relations<I, S>(deprels: I) -> Result<Self, NlpError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels = transition_labels(deprels)
            .iter()
            .map(ToString::to_string)
            .collect::<LabelMap>();
        Self::new(labels)
    }

    /// The label vocabulary.
    pub fn labels(&self) -> &LabelMap {
        &self.labels
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// `true` for an empty vocabulary.
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// The parsed label at `index`.
    pub fn transition(&self, index: usize) -> Option<&TransitionLabel> {
        self.transitions.get(index)
    }

    /// `true` when `deprel` has arc labels.
    pub fn has_relation(&self, deprel: &str) -> bool {
        self.right_arcs
            .iter()
            .any(|index| self.transitions[*index].deprel == deprel)
    }

    /// Labels legal in `category`.
    pub fn candidates(&self, category: Category) -> &[usize] {
        &self.categories[category as usize]
    }

    /// Every left-arc label.
    pub fn left_arcs(&self) -> &[usize] {
        &self.left_arcs
    }

    /// Every right-arc label.
    pub fn right_arcs(&self) -> &[usize] {
        &self.right_arcs
    }
}
