//! Error types for the NLP components.

use dialog_learn::LearnError;
use thiserror::Error;

/// Configuration errors, surfaced before the first training step.
///
/// Feature extraction, transitions and decoding never fail; missing values
/// and unseen keys simply produce no feature.
#[derive(Debug, Error)]
pub enum NlpError {
    /// No feature template is registered under this id.
    #[error("unknown feature template '{0}'")]
    UnknownTemplate(String),

    /// A training sentence uses a dependency relation outside the label
    /// vocabulary.
    #[error("dependency relation '{0}' is not in the label vocabulary")]
    UnknownRelation(String),

    /// A training sentence uses a tag outside the label vocabulary.
    #[error("tag '{0}' is not in the label vocabulary")]
    UnknownTag(String),

    /// A training token has no tag to learn from.
    #[error("token {token} has no tag")]
    MissingTag {
        /// 1-based token id.
        token: usize,
    },

    /// A transition label string could not be parsed.
    #[error("malformed transition label '{0}'")]
    MalformedLabel(String),

    /// The label vocabulary leaves a structural category without any label.
    #[error("label vocabulary has no label for the '{0}' category")]
    EmptyCategory(&'static str),

    /// The optimizer was built with a different label vocabulary.
    #[error("optimizer label '{found}' at index {index} does not match '{expected}'")]
    LabelMismatch {
        /// Position in the vocabulary.
        index: usize,
        /// Label the task requires.
        expected: String,
        /// Label the optimizer holds.
        found: String,
    },

    /// A gold head points outside the sentence.
    #[error("token {token} has head {head} outside a sentence of {len} tokens")]
    HeadOutOfRange {
        /// 1-based token id.
        token: usize,
        /// The offending head id.
        head: usize,
        /// Number of tokens.
        len: usize,
    },

    /// A state offered no transition before reaching its end.
    #[error("no legal transition in a non-terminal state")]
    NoLegalTransition,

    /// Invalid training settings.
    #[error("training setting '{name}' is out of range: {value}")]
    InvalidSetting {
        /// Name of the setting.
        name: &'static str,
        /// The rejected value.
        value: String,
    },

    /// The learning layer rejected its configuration.
    #[error(transparent)]
    Learn(#[from] LearnError),
}
