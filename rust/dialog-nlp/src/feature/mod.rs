//! Feature templates.
//!
//! A [`FeatureTemplate`] is a declarative list of [`FeatureItem`]s. Each
//! item names where to look in a state (stack, input or the passed-node
//! deque, plus a relative offset), an optional structural hop through the
//! partial tree, and which field of the node to read. Extraction resolves
//! the items against a [`crate::state::State`] and maps the resulting
//! strings to indices through a [`dialog_learn::FeatureMap`].

mod item;
mod preset;
mod template;

pub use item::*;
pub use preset::*;
pub use template::*;
