//! Non-projective dependency parsing with the list-based transition system.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::candidate::LabelCandidateIndex;
use crate::component::{OnlineComponent, Scorer, Task};
use crate::error::NlpError;
use crate::state::{DependencyState, State};
use crate::token::Sentence;

/// Relation given to nodes the decoder attaches to the root as a last
/// resort.
pub const ROOT_RELATION: &str = "root";

/// A dependency parser trained online.
pub type OnlineDependencyParser = OnlineComponent<DependencyParser>;

/// The dependency parsing task: the label vocabulary of every relation in
/// the training data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyParser {
    index: Arc<LabelCandidateIndex>,
}

impl DependencyParser {
    /// A parser for exactly these relations.
    pub fn with_relations<I, S>(deprels: I) -> Result<Self, NlpError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self {
            index: Arc::new(LabelCandidateIndex::from_relations(deprels)?),
        })
    }

    /// A parser for every relation used in `corpus`.
    pub fn from_corpus(corpus: &[Sentence]) -> Result<Self, NlpError> {
        let deprels: BTreeSet<&str> = corpus
            .iter()
            .flat_map(Sentence::tokens)
            .filter_map(|token| token.deprel.as_deref())
            .collect();
        Self::with_relations(deprels)
    }

    /// The label vocabulary with its candidate sets.
    pub fn index(&self) -> &LabelCandidateIndex {
        &self.index
    }

    /// Gives every node left without a head the best-scoring head that
    /// keeps the tree acyclic. Heads are tried nearest first, the left side
    /// before the right; the root with [`ROOT_RELATION`] is the fallback.
    fn attach_headless(&self, state: &mut DependencyState, scorer: &Scorer<'_>) {
        for node in state.headless() {
            let len = state.tokens().len();
            let heads = (0..node).rev().chain(node + 1..len);

            let mut best: Option<(f32, usize, usize)> = None;
            for head in heads {
                if state.graph().is_descendant_of(head, node) {
                    continue;
                }

                let (stack, input, labels) = if head < node {
                    (head, node, self.index.right_arcs())
                } else {
                    (node, head, self.index.left_arcs())
                };
                let scores = state.with_focus(stack, input, |state| scorer.scores(state));

                for label in labels {
                    let score = scores.get(*label).copied().unwrap_or_default();
                    if best.is_none_or(|(best_score, _, _)| score > best_score) {
                        best = Some((score, head, *label));
                    }
                }
            }

            let (head, deprel) = best
                .and_then(|(_, head, label)| Some((head, self.index.transition(label)?.deprel.clone())))
                .unwrap_or_else(|| {
                    debug!(node, "No head candidate, attaching to the root");
                    (0, ROOT_RELATION.to_string())
                });

            trace!(node, head, deprel = %deprel, "Attaching headless node");
            state.attach(node, head, &deprel);
        }
    }
}

impl Task for DependencyParser {
    type State = DependencyState;

    fn labels(&self) -> Vec<String> {
        self.index.labels().iter().map(str::to_string).collect()
    }

    fn check(&self, sentence: &Sentence) -> Result<(), NlpError> {
        for token in sentence.tokens() {
            if let Some(deprel) = &token.deprel {
                if !self.index.has_relation(deprel) {
                    return Err(NlpError::UnknownRelation(deprel.clone()));
                }
            }
        }
        Ok(())
    }

    fn state(&self, sentence: &Sentence) -> DependencyState {
        DependencyState::new(sentence, self.index.clone())
    }

    fn post_process(&self, state: &mut DependencyState, scorer: &Scorer<'_>) {
        self.attach_headless(state, scorer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feature::FeatureTemplate;
    use crate::lexicon::Lexica;
    use crate::token::Token;
    use dialog_learn::{Method, OnlineOptimizer};

    fn corpus() -> Vec<Sentence> {
        vec![Sentence::new(vec![
            Token::new("dogs").with_head(2, "nsubj"),
            Token::new("bark").with_head(0, "root"),
        ])]
    }

    #[test]
    fn relations_come_from_the_corpus() {
        let parser = DependencyParser::from_corpus(&corpus()).unwrap();
        assert_eq!(
            parser.labels(),
            vec![
                "N_S_", "N_R_", "N_P_", "L_R_nsubj", "L_P_nsubj", "R_S_nsubj", "R_P_nsubj",
                "L_R_root", "L_P_root", "R_S_root", "R_P_root",
            ]
        );
        assert!(parser.check(&corpus()[0]).is_ok());

        let unknown = Sentence::new(vec![Token::new("x").with_head(0, "dep")]);
        assert!(matches!(parser.check(&unknown), Err(NlpError::UnknownRelation(r)) if r == "dep"));
    }

    #[test]
    fn decoding_leaves_no_node_headless() {
        let parser = DependencyParser::from_corpus(&corpus()).unwrap();
        let optimizer = OnlineOptimizer::new(Method::perceptron(), 1.0, 0.0).unwrap();
        let component =
            OnlineComponent::new(parser, FeatureTemplate::preset("dep0", 0).unwrap(), optimizer).unwrap();

        let sentence = Sentence::tokenize("cats sleep all day");
        let state = component.decode(&sentence, &Lexica::new()).unwrap();
        assert!(state.headless().is_empty());
        assert!(state.sentence().tokens().iter().all(|token| token.head.is_some()));
    }
}
