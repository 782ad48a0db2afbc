//! # Dialog NLP — transition-based taggers and dependency parsers
//!
//! Statistical components that annotate tokenized sentences one decision at
//! a time. Each component is a task-specific transition system, a feature
//! template and an online optimizer from `dialog-learn`, trained with a
//! dynamic oracle and a roll-in schedule so the model learns to recover
//! from its own mistakes.
//!
//! ## Core Ideas
//!
//! - **States hide gold**: a state keeps gold annotations in a side table;
//!   features are read from the live tokens and the partial tree only.
//! - **One decision per step**: a dependency transition combines the arc,
//!   the list movement and the relation into a single label, and a
//!   [`candidate::LabelCandidateIndex`] lists the labels legal in each
//!   structural situation.
//! - **Dynamic oracle**: for any configuration, including ones reached by
//!   wrong moves, the oracle returns every transition that loses the fewest
//!   gold arcs.
//! - **Caller-owned lexica**: word clusters and other resources are passed
//!   by reference into feature extraction, never cached globally.
//!
//! ## Architecture
//!
//! ```text
//! Sentence (tokens) → Task::state (gold moved aside)
//!   → FeatureTemplate (state → FeatureVector)
//!     → OnlineOptimizer::train (gold vs. predicted)
//!       → RollIn (apply gold or predicted) → State::apply
//!         → Trainer (epochs, held-out selection)
//! ```

pub mod candidate;
pub mod component;
pub mod error;
pub mod eval;
pub mod feature;
pub mod form;
pub mod graph;
pub mod lexicon;
pub mod parser;
pub mod state;
pub mod tagger;
pub mod token;
pub mod train;
pub mod transition;
