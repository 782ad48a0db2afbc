use std::sync::Arc;

use dialog_learn::LabelMap;

use super::{State, offset};
use crate::eval::Accuracy;
use crate::feature::Source;
use crate::graph::Graph;
use crate::token::{Sentence, Token};

/// Tags tokens left to right, one label per token.
///
/// Tags predicted so far are visible to features of later tokens; gold
/// tags are kept aside.
#[derive(Debug, Clone)]
pub struct TaggingState {
    tokens: Vec<Token>,
    gold: Vec<Option<String>>,
    tags: Arc<LabelMap>,
    graph: Graph,
    input: usize,
}

impl TaggingState {
    /// Creates the initial state for `sentence`.
    pub fn new(sentence: &Sentence, tags: Arc<LabelMap>) -> Self {
        let mut tokens = Vec::with_capacity(sentence.len() + 1);
        let mut gold = Vec::with_capacity(sentence.len() + 1);
        tokens.push(Token::root());
        gold.push(None);

        for token in sentence.tokens() {
            let mut token = token.clone();
            gold.push(token.pos.take());
            tokens.push(token);
        }

        let graph = Graph::new(tokens.len());
        Self {
            tokens,
            gold,
            tags,
            graph,
            input: 1,
        }
    }

    /// The next token to tag.
    pub fn input(&self) -> usize {
        self.input
    }
}

impl State for TaggingState {
    type Eval = Accuracy;

    fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn graph(&self) -> &Graph {
        &self.graph
    }

    fn node(&self, source: Source, window: i32) -> Option<usize> {
        match source {
            Source::Input => offset(self.input, window, 1..self.tokens.len()),
            Source::Stack | Source::Peek => None,
        }
    }

    fn is_terminal(&self) -> bool {
        self.input >= self.tokens.len()
    }

    fn candidates(&self) -> Option<&[usize]> {
        None
    }

    fn oracle(&self) -> Vec<usize> {
        self.gold
            .get(self.input)
            .and_then(Option::as_deref)
            .and_then(|tag| self.tags.index(tag))
            .into_iter()
            .collect()
    }

    fn apply(&mut self, label: usize) {
        if let Some(token) = self.tokens.get_mut(self.input) {
            token.pos = self.tags.label(label).map(str::to_string);
            self.input += 1;
        }
    }

    fn evaluate(&self, eval: &mut Accuracy) {
        for (token, gold) in self.tokens.iter().zip(&self.gold).skip(1) {
            if let Some(gold) = gold {
                eval.add(token.pos.as_ref() == Some(gold));
            }
        }
    }

    fn sentence(&self) -> Sentence {
        self.tokens.iter().skip(1).cloned().collect()
    }
}
