//! Epoch-level training.
//!
//! A [`Trainer`] shuffles the corpus, trains a component sentence by
//! sentence, flushes mini-batches and keeps the best model seen on
//! held-out data. A [`RollIn`] decides at every step whether the state
//! follows the gold transition or the model's own prediction; its gold
//! probability decays after every epoch so the model meets its own mistakes
//! during training.

mod rollin;
mod trainer;

pub use rollin::*;
pub use trainer::*;
