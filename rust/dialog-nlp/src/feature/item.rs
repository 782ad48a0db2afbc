use serde::{Deserialize, Serialize};

use crate::form::{prefix, shape, simplify, simplify_lowercase, suffix};
use crate::graph::Graph;
use crate::lexicon::Lexica;
use crate::token::Token;

/// Where an item starts looking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// The node on top of the stack; the window is a linear offset from it.
    Stack,
    /// The next input node; the window is a linear offset from it.
    Input,
    /// A window `≤ 0` reads that deep into the stack; a window `> 0` reads
    /// the nodes passed over for the current input, most recently passed
    /// first.
    Peek,
}

/// A hop through the partial tree. The number selects the first (`0`) or
/// second (`1`) node of its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    /// The head.
    Head,
    /// The head's head.
    GrandHead,
    /// Leftmost dependent.
    LeftmostDependent(usize),
    /// Rightmost dependent.
    RightmostDependent(usize),
    /// Closest left dependent.
    LeftNearestDependent(usize),
    /// Closest right dependent.
    RightNearestDependent(usize),
    /// Closest left sibling.
    LeftNearestSibling(usize),
    /// Closest right sibling.
    RightNearestSibling(usize),
}

impl Relation {
    /// Follows the relation from `id`.
    pub fn follow(&self, graph: &Graph, id: usize) -> Option<usize> {
        match *self {
            Relation::Head => graph.head(id),
            Relation::GrandHead => graph.grand_head(id),
            Relation::LeftmostDependent(order) => graph.leftmost_dependent(id, order),
            Relation::RightmostDependent(order) => graph.rightmost_dependent(id, order),
            Relation::LeftNearestDependent(order) => graph.left_nearest_dependent(id, order),
            Relation::RightNearestDependent(order) => graph.right_nearest_dependent(id, order),
            Relation::LeftNearestSibling(order) => graph.left_nearest_sibling(id, order),
            Relation::RightNearestSibling(order) => graph.right_nearest_sibling(id, order),
        }
    }
}

/// A single-valued field of a node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    /// The surface form.
    WordForm,
    /// The form with digits and links collapsed.
    Simplified,
    /// The lower-cased simplified form.
    Lowercase,
    /// The word shape.
    Shape,
    /// The lemma.
    Lemma,
    /// One morphological feature.
    Feats(String),
    /// The part-of-speech tag visible to the state.
    PartOfSpeech,
    /// The relation to the head assigned so far.
    DependencyLabel,
    /// Left and right dependent counts so far.
    Valency,
    /// A prefix of the given length.
    Prefix(usize),
    /// A suffix of the given length.
    Suffix(usize),
    /// The category from a named lexicon.
    Lexicon(String),
}

impl Field {
    /// Reads a token-level field. Structural fields yield `None` here and
    /// are answered by the state.
    pub fn read(&self, token: &Token, lexica: &Lexica) -> Option<String> {
        match self {
            Field::WordForm => Some(token.form.clone()),
            Field::Simplified => Some(simplify(&token.form)),
            Field::Lowercase => Some(simplify_lowercase(&token.form)),
            Field::Shape => Some(shape(&token.form)),
            Field::Lemma => token.lemma.clone(),
            Field::Feats(key) => token.feats.get(key).cloned(),
            Field::PartOfSpeech => token.pos.clone(),
            Field::Prefix(n) => prefix(&token.form, *n),
            Field::Suffix(n) => suffix(&token.form, *n),
            Field::Lexicon(name) => lexica.get(name)?.category(token),
            Field::DependencyLabel | Field::Valency => None,
        }
    }
}

/// A field that yields any number of values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetField {
    /// Orthographic properties of the form.
    Orthographic,
    /// `0` for the first token, `1` for the last.
    Positional,
    /// Every category from a named lexicon.
    Clusters(String),
}

/// A numeric field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DenseField {
    /// Relative position of the node in the sentence.
    Position,
    /// Distance between the stack top and the input, relative to the
    /// sentence length.
    Distance,
    /// The magnitude from a named lexicon.
    Lexicon(String),
}

/// One descriptor of a feature template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureItem<F = Field> {
    /// Starting point.
    pub source: Source,
    /// Offset from the starting point.
    pub window: i32,
    /// Optional hop through the tree.
    pub relation: Option<Relation>,
    /// What to read.
    pub field: F,
}

impl<F> FeatureItem<F> {
    /// Creates an item.
    pub fn new(source: Source, window: i32, field: F) -> Self {
        Self {
            source,
            window,
            relation: None,
            field,
        }
    }

    /// Reads from the stack.
    pub fn stack(window: i32, field: F) -> Self {
        Self::new(Source::Stack, window, field)
    }

    /// Reads from the input.
    pub fn input(window: i32, field: F) -> Self {
        Self::new(Source::Input, window, field)
    }

    /// Peeks into the stack or the passed nodes.
    pub fn peek(window: i32, field: F) -> Self {
        Self::new(Source::Peek, window, field)
    }

    /// Adds a structural hop.
    pub fn with_relation(mut self, relation: Relation) -> Self {
        self.relation = Some(relation);
        self
    }
}
