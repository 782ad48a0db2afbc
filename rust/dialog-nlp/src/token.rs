//! Tokens and sentences handed over by a corpus reader.
//!
//! Token ids are 1-based; id `0` is the artificial root every state adds in
//! front of the sentence. Gold annotations (`head`, `deprel`, and `pos` for
//! tagging) travel with the token only until a state is built from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::NlpError;

/// Word form, lemma and tag of the artificial root.
pub const ROOT_TAG: &str = "@#r$%";

/// A single annotated token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The surface form.
    pub form: String,
    /// The lemma, if known.
    pub lemma: Option<String>,
    /// The part-of-speech tag, if known.
    pub pos: Option<String>,
    /// Morphological features.
    pub feats: BTreeMap<String, String>,
    /// Gold head id (`0` for the root).
    pub head: Option<usize>,
    /// Gold dependency relation to the head.
    pub deprel: Option<String>,
}

impl Token {
    /// Creates an unannotated token.
    pub fn new(form: impl Into<String>) -> Self {
        Self {
            form: form.into(),
            ..Self::default()
        }
    }

    /// The artificial root.
    pub fn root() -> Self {
        Self::new(ROOT_TAG)
            .with_lemma(ROOT_TAG)
            .with_pos(ROOT_TAG)
    }

    /// Sets the lemma.
    pub fn with_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = Some(lemma.into());
        self
    }

    /// Sets the part-of-speech tag.
    pub fn with_pos(mut self, pos: impl Into<String>) -> Self {
        self.pos = Some(pos.into());
        self
    }

    /// Adds a morphological feature.
    pub fn with_feat(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.feats.insert(key.into(), value.into());
        self
    }

    /// Sets the gold head and relation.
    pub fn with_head(mut self, head: usize, deprel: impl Into<String>) -> Self {
        self.head = Some(head);
        self.deprel = Some(deprel.into());
        self
    }
}

/// An ordered sequence of tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    tokens: Vec<Token>,
}

impl Sentence {
    /// Wraps tokens in reading order.
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// Splits raw text on whitespace into unannotated tokens.
    pub fn tokenize(text: &str) -> Self {
        Self::new(text.split_whitespace().map(Token::new).collect())
    }

    /// The tokens, without the root.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of tokens, without the root.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// `true` for an empty sentence.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Checks that every gold head points into the sentence and not at the
    /// token itself.
    pub fn validate(&self) -> Result<(), NlpError> {
        let len = self.tokens.len();
        for (position, token) in self.tokens.iter().enumerate() {
            let id = position + 1;
            if let Some(head) = token.head {
                if head > len || head == id {
                    return Err(NlpError::HeadOutOfRange {
                        token: id,
                        head,
                        len,
                    });
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<Token> for Sentence {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_splits_on_whitespace() {
        let sentence = Sentence::tokenize("  The dog\tbarked ");
        assert_eq!(sentence.len(), 3);
        assert_eq!(sentence.tokens()[0].form, "The");
        assert_eq!(sentence.tokens()[2].form, "barked");
        assert_eq!(sentence.tokens()[1].head, None);
    }

    #[test]
    fn validate_rejects_heads_outside_the_sentence() {
        let sentence = Sentence::new(vec![
            Token::new("a").with_head(2, "det"),
            Token::new("dog").with_head(3, "root"),
        ]);
        assert!(matches!(
            sentence.validate(),
            Err(NlpError::HeadOutOfRange { token: 2, head: 3, len: 2 })
        ));

        let looped = Sentence::new(vec![Token::new("a").with_head(1, "dep")]);
        assert!(looped.validate().is_err());
    }
}
