//! Caller-owned lexical resources.
//!
//! Word clusters, embeddings-derived values and gazetteers are loaded by the
//! caller and handed to feature extraction by reference as [`Lexica`]. The
//! components never load or cache them.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::form::simplify_lowercase;
use crate::token::Token;

/// A lookup from a token to a categorical and/or numeric value.
pub trait Lexicon: Send + Sync {
    /// The token's category, if the lexicon knows it.
    fn category(&self, token: &Token) -> Option<String>;

    /// Every category the token belongs to.
    fn categories(&self, token: &Token) -> Vec<String> {
        self.category(token).into_iter().collect()
    }

    /// A numeric value for the token.
    fn magnitude(&self, _token: &Token) -> Option<f32> {
        None
    }
}

/// Named lexicons available to feature templates.
#[derive(Default)]
pub struct Lexica {
    lexicons: BTreeMap<String, Box<dyn Lexicon>>,
}

impl fmt::Debug for Lexica {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.lexicons.keys()).finish()
    }
}

impl Lexica {
    /// No lexicons.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `lexicon` under `name`.
    pub fn with(mut self, name: impl Into<String>, lexicon: impl Lexicon + 'static) -> Self {
        self.insert(name, lexicon);
        self
    }

    /// Registers `lexicon` under `name`, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, lexicon: impl Lexicon + 'static) {
        self.lexicons.insert(name.into(), Box::new(lexicon));
    }

    /// The lexicon registered under `name`.
    pub fn get(&self, name: &str) -> Option<&dyn Lexicon> {
        self.lexicons.get(name).map(Box::as_ref)
    }
}

/// Word clusters keyed by lower-cased simplified form.
#[derive(Debug, Clone, Default)]
pub struct WordClusters {
    clusters: HashMap<String, Vec<String>>,
}

impl WordClusters {
    /// No clusters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `word` to `cluster`.
    pub fn insert(&mut self, word: &str, cluster: impl Into<String>) {
        self.clusters
            .entry(simplify_lowercase(word))
            .or_default()
            .push(cluster.into());
    }
}

impl Lexicon for WordClusters {
    fn category(&self, token: &Token) -> Option<String> {
        self.clusters
            .get(&simplify_lowercase(&token.form))
            .and_then(|clusters| clusters.first().cloned())
    }

    fn categories(&self, token: &Token) -> Vec<String> {
        self.clusters
            .get(&simplify_lowercase(&token.form))
            .cloned()
            .unwrap_or_default()
    }
}

/// A numeric value per lower-cased simplified form.
#[derive(Debug, Clone, Default)]
pub struct WordScores {
    scores: HashMap<String, f32>,
}

impl WordScores {
    /// No scores.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the score of `word`.
    pub fn insert(&mut self, word: &str, score: f32) {
        self.scores.insert(simplify_lowercase(word), score);
    }
}

impl Lexicon for WordScores {
    fn category(&self, _token: &Token) -> Option<String> {
        None
    }

    fn magnitude(&self, token: &Token) -> Option<f32> {
        self.scores.get(&simplify_lowercase(&token.form)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clusters_match_simplified_forms() {
        let mut clusters = WordClusters::new();
        clusters.insert("Dog", "0110");
        clusters.insert("dog", "01101");
        clusters.insert("1984", "111");

        let lexica = Lexica::new().with("brown", clusters);
        let brown = lexica.get("brown").unwrap();

        assert_eq!(brown.category(&Token::new("DOG")), Some("0110".to_string()));
        assert_eq!(brown.categories(&Token::new("dog")), vec!["0110", "01101"]);
        assert_eq!(brown.category(&Token::new("2001")), Some("111".to_string()));
        assert_eq!(brown.category(&Token::new("cat")), None);
        assert!(lexica.get("embeddings").is_none());
    }

    #[test]
    fn scores_are_numeric_only() {
        let mut scores = WordScores::new();
        scores.insert("good", 0.8);
        let token = Token::new("Good");
        assert_eq!(scores.magnitude(&token), Some(0.8));
        assert_eq!(scores.category(&token), None);
    }
}
