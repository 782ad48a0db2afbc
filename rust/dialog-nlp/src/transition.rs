//! Combined transition labels of the list-based dependency parser.
//!
//! One classification decides a whole step: whether to build an arc
//! between the stack top and the next input node, how to move the lists,
//! and which relation the arc carries. Labels are written
//! `arc_list_deprel`, for example `L_R_nsubj` or `N_S_`.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::NlpError;

/// Arc decision between the stack top `s` and the input `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArcMove {
    /// `i` becomes the head of `s`.
    Left,
    /// `s` becomes the head of `i`.
    Right,
    /// No arc.
    NoArc,
}

/// List movement after the arc decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ListMove {
    /// Restore the passed nodes, push the input and advance.
    Shift,
    /// Pop the stack.
    Reduce,
    /// Move the stack top to the passed nodes.
    Pass,
}

impl ArcMove {
    fn symbol(self) -> &'static str {
        match self {
            ArcMove::Left => "L",
            ArcMove::Right => "R",
            ArcMove::NoArc => "N",
        }
    }
}

impl ListMove {
    fn symbol(self) -> &'static str {
        match self {
            ListMove::Shift => "S",
            ListMove::Reduce => "R",
            ListMove::Pass => "P",
        }
    }
}

/// Arc move, list move and relation of one step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransitionLabel {
    /// Arc decision.
    pub arc: ArcMove,
    /// List movement.
    pub list: ListMove,
    /// Relation of the arc; empty without one.
    pub deprel: String,
}

impl TransitionLabel {
    /// Creates a label, rejecting combinations the parser never uses.
    pub fn new(arc: ArcMove, list: ListMove, deprel: impl Into<String>) -> Result<Self, NlpError> {
        let label = Self {
            arc,
            list,
            deprel: deprel.into(),
        };
        let valid = match (arc, list) {
            (ArcMove::Left, ListMove::Shift) | (ArcMove::Right, ListMove::Reduce) => false,
            (ArcMove::NoArc, _) => label.deprel.is_empty(),
            _ => !label.deprel.is_empty(),
        };
        if valid {
            Ok(label)
        } else {
            Err(NlpError::MalformedLabel(label.to_string()))
        }
    }

    /// A label without an arc.
    pub fn no_arc(list: ListMove) -> Self {
        Self {
            arc: ArcMove::NoArc,
            list,
            deprel: String::new(),
        }
    }

    /// `true` for left and right arcs.
    pub fn is_arc(&self) -> bool {
        self.arc != ArcMove::NoArc
    }
}

impl fmt::Display for TransitionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.arc.symbol(), self.list.symbol(), self.deprel)
    }
}

impl FromStr for TransitionLabel {
    type Err = NlpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || NlpError::MalformedLabel(s.to_string());
        let mut parts = s.splitn(3, '_');
        let arc = match parts.next() {
            Some("L") => ArcMove::Left,
            Some("R") => ArcMove::Right,
            Some("N") => ArcMove::NoArc,
            _ => return Err(malformed()),
        };
        let list = match parts.next() {
            Some("S") => ListMove::Shift,
            Some("R") => ListMove::Reduce,
            Some("P") => ListMove::Pass,
            _ => return Err(malformed()),
        };
        let deprel = parts.next().ok_or_else(malformed)?;
        TransitionLabel::new(arc, list, deprel).map_err(|_| malformed())
    }
}

/// The label vocabulary for a set of dependency relations: the three
/// no-arc labels first, then four arc labels per relation in sorted order.
pub fn transition_labels<I, S>(deprels: I) -> Vec<TransitionLabel>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let deprels: BTreeSet<String> = deprels
        .into_iter()
        .map(Into::into)
        .filter(|deprel| !deprel.is_empty())
        .collect();

    let mut labels = vec![
        TransitionLabel::no_arc(ListMove::Shift),
        TransitionLabel::no_arc(ListMove::Reduce),
        TransitionLabel::no_arc(ListMove::Pass),
    ];
    for deprel in deprels {
        for (arc, list) in [
            (ArcMove::Left, ListMove::Reduce),
            (ArcMove::Left, ListMove::Pass),
            (ArcMove::Right, ListMove::Shift),
            (ArcMove::Right, ListMove::Pass),
        ] {
            labels.push(TransitionLabel {
                arc,
                list,
                deprel: deprel.clone(),
            });
        }
    }
    labels
}
