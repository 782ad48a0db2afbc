//! Error types for the learning layer.

use thiserror::Error;

/// Configuration and persistence failures.
///
/// Steady-state training and scoring never fail; everything here is either a
/// misconfiguration caught before the first training step or a codec error.
#[derive(Debug, Error)]
pub enum LearnError {
    /// The learning rate must be strictly positive.
    #[error("learning rate must be positive, got {0}")]
    InvalidLearningRate(f32),

    /// A hyper-parameter is out of its valid range.
    #[error("hyper-parameter '{name}' is out of range: {value}")]
    InvalidHyperParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// The rejected value, rendered for display.
        value: String,
    },

    /// A weight matrix was asked to shrink.
    #[error(
        "weight matrix cannot shrink from {labels}x{features} to {new_labels}x{new_features}"
    )]
    Shrink {
        /// Current label size.
        labels: usize,
        /// Current feature size.
        features: usize,
        /// Requested label size.
        new_labels: usize,
        /// Requested feature size.
        new_features: usize,
    },

    /// A gold label is outside the label vocabulary.
    #[error("label {label} is outside the label vocabulary of size {size}")]
    LabelOutOfRange {
        /// The offending label index.
        label: usize,
        /// The vocabulary size.
        size: usize,
    },

    /// An instance was trained without any correct label.
    #[error("instance has no zero-cost label")]
    EmptyGold,

    /// The model blob could not be encoded or decoded.
    #[error("model codec failure: {0}")]
    Codec(String),
}
