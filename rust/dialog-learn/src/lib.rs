//! # Dialog Learn — online learning for structured prediction
//!
//! The numeric core behind the transition-based components in `dialog-nlp`.
//! A component turns every decoding step into an [`Instance`]: a
//! [`FeatureVector`] plus the set of labels that are correct at that step.
//! An [`OnlineOptimizer`] scores the instance against its [`WeightVector`],
//! picks the gold and predicted labels and updates the weights in place.
//!
//! ## Architecture
//!
//! ```text
//! FeatureMap (string key → index) → SparseVector / dense values
//!   → Instance (features, zero-cost labels)
//!     → OnlineOptimizer::train (score, predict, update)
//!       → WeightVector (label × feature, row or column major)
//! ```
//!
//! Every update strategy is a variant of [`Method`]; an optional
//! [`RegularizedDualAveraging`] term makes any of them produce sparse models.
//! Persisted state (weights, vocabularies) serializes through [`to_bytes`]
//! and [`from_bytes`].

mod error;
mod feature_map;
mod hyper;
mod instance;
mod label;
mod major;
mod math;
mod model;
mod optimizer;
mod regularizer;
mod sparse;
mod weight;

pub use error::*;
pub use feature_map::*;
pub use hyper::*;
pub use instance::*;
pub use label::*;
pub use major::*;
pub use math::*;
pub use model::*;
pub use optimizer::*;
pub use regularizer::*;
pub use sparse::*;
pub use weight::*;
