//! Left-to-right part-of-speech tagging.

use std::collections::BTreeSet;
use std::sync::Arc;

use dialog_learn::LabelMap;
use serde::{Deserialize, Serialize};

use crate::component::{OnlineComponent, Task};
use crate::error::NlpError;
use crate::state::TaggingState;
use crate::token::Sentence;

/// A part-of-speech tagger trained online.
pub type OnlinePartOfSpeechTagger = OnlineComponent<PartOfSpeechTagger>;

/// The tagging task: one label per tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartOfSpeechTagger {
    tags: Arc<LabelMap>,
}

impl PartOfSpeechTagger {
    /// A tagger for exactly these tags, in this order.
    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tags: Arc::new(tags.into_iter().collect()),
        }
    }

    /// A tagger for every tag used in `corpus`, in sorted order.
    pub fn from_corpus(corpus: &[Sentence]) -> Self {
        let tags: BTreeSet<&str> = corpus
            .iter()
            .flat_map(Sentence::tokens)
            .filter_map(|token| token.pos.as_deref())
            .collect();
        Self::with_tags(tags)
    }

    /// The tag vocabulary.
    pub fn tags(&self) -> &LabelMap {
        &self.tags
    }
}

impl Task for PartOfSpeechTagger {
    type State = TaggingState;

    fn labels(&self) -> Vec<String> {
        self.tags.iter().map(str::to_string).collect()
    }

    fn check(&self, sentence: &Sentence) -> Result<(), NlpError> {
        for (id, token) in sentence.tokens().iter().enumerate() {
            match &token.pos {
                None => return Err(NlpError::MissingTag { token: id + 1 }),
                Some(tag) if self.tags.index(tag).is_none() => {
                    return Err(NlpError::UnknownTag(tag.clone()));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn state(&self, sentence: &Sentence) -> TaggingState {
        TaggingState::new(sentence, self.tags.clone())
    }
}
