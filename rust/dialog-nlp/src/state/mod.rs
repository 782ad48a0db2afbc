//! Decoding states.
//!
//! A state owns one sentence, prefixed with the artificial root at node
//! `0`, and walks it with a transition system. Gold annotations live in a
//! side table that only [`State::oracle`] and [`State::evaluate`] read, so
//! feature extraction can never see them.
//!
//! The training loop, the decoder and the feature template are generic over
//! [`State`]; each task brings its own implementation.

mod dependency;
mod tagging;

pub use dependency::*;
pub use tagging::*;

use crate::eval::Evaluator;
use crate::feature::{DenseField, FeatureItem, Field, SetField, Source};
use crate::form::orthographic;
use crate::graph::Graph;
use crate::lexicon::Lexica;
use crate::token::{Sentence, Token};

/// The capability interface shared by every transition system.
pub trait State {
    /// Scores decoded states of this kind.
    type Eval: Evaluator;

    /// Every node, root first. Gold annotations are stripped.
    fn tokens(&self) -> &[Token];

    /// The partial tree built so far.
    fn graph(&self) -> &Graph;

    /// The node `window` steps away from `source`, if it exists.
    fn node(&self, source: Source, window: i32) -> Option<usize>;

    /// `true` once no further transition applies.
    fn is_terminal(&self) -> bool;

    /// Labels legal in the current configuration; `None` means every label
    /// of the vocabulary.
    fn candidates(&self) -> Option<&[usize]>;

    /// Every zero-cost label of the current configuration.
    fn oracle(&self) -> Vec<usize>;

    /// Performs the transition named by `label`.
    fn apply(&mut self, label: usize);

    /// Adds the agreement of the predictions with gold to `eval`.
    fn evaluate(&self, eval: &mut Self::Eval);

    /// The sentence carrying the predictions made so far.
    fn sentence(&self) -> Sentence;

    /// Distance between the focus nodes relative to the sentence length.
    fn distance(&self) -> Option<f32> {
        None
    }

    /// Finds the node an item reads from.
    fn locate<F>(&self, item: &FeatureItem<F>) -> Option<usize> {
        let id = self.node(item.source, item.window)?;
        match &item.relation {
            Some(relation) => relation.follow(self.graph(), id),
            None => Some(id),
        }
    }

    /// Reads a single-valued field of node `id`.
    fn field(&self, id: usize, field: &Field, lexica: &Lexica) -> Option<String> {
        match field {
            Field::DependencyLabel => self.graph().label(id).map(str::to_string),
            Field::Valency => {
                let (left, right) = self.graph().valency(id);
                Some(format!("{left}:{right}"))
            }
            _ => field.read(self.tokens().get(id)?, lexica),
        }
    }

    /// Reads a set-valued field of node `id`.
    fn values(&self, id: usize, field: &SetField, lexica: &Lexica) -> Vec<String> {
        let tokens = self.tokens();
        let Some(token) = tokens.get(id) else {
            return Vec::new();
        };

        match field {
            SetField::Orthographic => orthographic(&token.form, id == 1)
                .into_iter()
                .map(str::to_string)
                .collect(),
            SetField::Positional => {
                let mut values = Vec::new();
                if id == 1 {
                    values.push("0".to_string());
                }
                if id + 1 == tokens.len() {
                    values.push("1".to_string());
                }
                values
            }
            SetField::Clusters(name) => lexica
                .get(name)
                .map(|lexicon| lexicon.categories(token))
                .unwrap_or_default(),
        }
    }

    /// Resolves a numeric item.
    fn numeric(&self, item: &FeatureItem<DenseField>, lexica: &Lexica) -> Option<f32> {
        match &item.field {
            DenseField::Distance => self.distance(),
            DenseField::Position => {
                let id = self.locate(item)?;
                Some(id as f32 / self.tokens().len() as f32)
            }
            DenseField::Lexicon(name) => {
                let token = self.tokens().get(self.locate(item)?)?;
                lexica.get(name)?.magnitude(token)
            }
        }
    }

    /// Resolves a single-valued item.
    fn resolve(&self, item: &FeatureItem<Field>, lexica: &Lexica) -> Option<String> {
        let id = self.locate(item)?;
        self.field(id, &item.field, lexica)
    }

    /// Resolves a set-valued item.
    fn resolve_set(&self, item: &FeatureItem<SetField>, lexica: &Lexica) -> Vec<String> {
        self.locate(item)
            .map(|id| self.values(id, &item.field, lexica))
            .unwrap_or_default()
    }
}

/// Node `id + window` when it lies in `range`.
pub(crate) fn offset(id: usize, window: i32, range: std::ops::Range<usize>) -> Option<usize> {
    let target = id.checked_add_signed(window as isize)?;
    range.contains(&target).then_some(target)
}
