//! A task, its feature template and its optimizer, trained and decoded
//! together.

use dialog_learn::{
    FeatureVector, HyperParameter, Instance, OnlineOptimizer, argmax, argmax_of, from_bytes, to_bytes,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::NlpError;
use crate::feature::FeatureTemplate;
use crate::lexicon::Lexica;
use crate::state::State;
use crate::token::Sentence;
use crate::train::RollIn;

/// What a component predicts: its label vocabulary and how a sentence
/// becomes a decoding state.
pub trait Task: Clone {
    /// The transition system.
    type State: State;

    /// The label vocabulary in index order.
    fn labels(&self) -> Vec<String>;

    /// Rejects training sentences whose annotation the vocabulary cannot
    /// express.
    fn check(&self, sentence: &Sentence) -> Result<(), NlpError>;

    /// The initial state for `sentence`.
    fn state(&self, sentence: &Sentence) -> Self::State;

    /// Repairs a decoded state.
    fn post_process(&self, _state: &mut Self::State, _scorer: &Scorer<'_>) {}
}

/// Frozen scoring of states, for decoders and post-processing.
#[derive(Debug, Clone, Copy)]
pub struct Scorer<'a> {
    template: &'a FeatureTemplate,
    optimizer: &'a OnlineOptimizer,
    lexica: &'a Lexica,
}

impl<'a> Scorer<'a> {
    /// Wraps a trained template and optimizer.
    pub fn new(template: &'a FeatureTemplate, optimizer: &'a OnlineOptimizer, lexica: &'a Lexica) -> Self {
        Self {
            template,
            optimizer,
            lexica,
        }
    }

    /// Features of `state` without growing the vocabulary.
    pub fn features<S: State>(&self, state: &S) -> FeatureVector {
        self.template.feature_vector(state, self.lexica)
    }

    /// Scores of every label for `state`.
    pub fn scores<S: State>(&self, state: &S) -> Vec<f32> {
        self.optimizer.scores(&self.features(state))
    }

    /// The best legal label for `state`.
    pub fn best<S: State>(&self, state: &S) -> Option<usize> {
        best_candidate(&self.scores(state), state.candidates())
    }
}

fn best_candidate(scores: &[f32], candidates: Option<&[usize]>) -> Option<usize> {
    match candidates {
        Some(candidates) => argmax_of(scores, candidates.iter().copied()),
        None => argmax(scores),
    }
}

/// A trainable, decodable model for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnlineComponent<T> {
    task: T,
    template: FeatureTemplate,
    optimizer: OnlineOptimizer,
}

impl<T> OnlineComponent<T>
where
    T: Task + Serialize + DeserializeOwned,
{
    /// Binds `task` to a template and an optimizer, registering the task's
    /// labels with the optimizer.
    pub fn new(task: T, template: FeatureTemplate, mut optimizer: OnlineOptimizer) -> Result<Self, NlpError> {
        let labels = optimizer.labels_mut();
        for (index, expected) in task.labels().into_iter().enumerate() {
            if labels.add(&expected) != index {
                return Err(NlpError::LabelMismatch {
                    index,
                    found: labels.label(index).unwrap_or_default().to_string(),
                    expected,
                });
            }
        }

        Ok(Self {
            task,
            template,
            optimizer,
        })
    }

    /// Binds `task` to the preset template `preset` and a fresh optimizer,
    /// both configured by `hyper`.
    pub fn with_preset(task: T, preset: &str, hyper: &HyperParameter) -> Result<Self, NlpError> {
        let template = FeatureTemplate::preset(preset, hyper.feature_cutoff)?;
        Self::new(task, template, hyper.optimizer()?)
    }

    /// The task.
    pub fn task(&self) -> &T {
        &self.task
    }

    /// The feature template.
    pub fn template(&self) -> &FeatureTemplate {
        &self.template
    }

    /// The optimizer.
    pub fn optimizer(&self) -> &OnlineOptimizer {
        &self.optimizer
    }

    /// Frozen scoring with this component's weights.
    pub fn scorer<'a>(&'a self, lexica: &'a Lexica) -> Scorer<'a> {
        Scorer::new(&self.template, &self.optimizer, lexica)
    }

    /// Trains on one sentence.
    pub fn train_sentence(&mut self, sentence: &Sentence, roll_in: &mut RollIn, lexica: &Lexica) -> Result<usize, NlpError> {
        let mut state = self.task.state(sentence);
        self.train_state(&mut state, roll_in, lexica)
    }

    /// Walks `state` to its end, training on every step. The next
    /// transition is the gold label the update trained towards when the
    /// roll-in picks gold, and the best legal label under the weights
    /// before the update otherwise. Returns the number of steps.
    pub fn train_state(&mut self, state: &mut T::State, roll_in: &mut RollIn, lexica: &Lexica) -> Result<usize, NlpError> {
        let mut steps = 0;
        while !state.is_terminal() {
            let features = self.template.create_feature_vector(state, true, lexica);
            let mut instance = Instance::new(features, state.oracle());
            self.optimizer.train(&mut instance)?;

            let scores = match instance.scores() {
                Some(scores) => scores.to_vec(),
                None => self.optimizer.scores(instance.features()),
            };
            let label = if roll_in.choose_gold() {
                instance.gold_label().or_else(|| instance.best_gold(&scores))
            } else {
                best_candidate(&scores, state.candidates())
            }
            .ok_or(NlpError::NoLegalTransition)?;

            trace!(step = steps, label, gold = ?instance.gold_label(), "Applying transition");
            state.apply(label);
            steps += 1;
        }
        Ok(steps)
    }

    /// Forgets how often keys below the feature cutoff were seen, so a key
    /// has to pass the cutoff again within the next pass over the data.
    pub fn clear_feature_counts(&mut self) {
        self.template.clear_counts();
    }

    /// Flushes pending mini-batch gradients.
    pub fn update_mini_batch(&mut self) {
        self.optimizer.update_mini_batch();
    }

    /// Decodes `sentence` greedily.
    pub fn decode(&self, sentence: &Sentence, lexica: &Lexica) -> Result<T::State, NlpError> {
        let mut state = self.task.state(sentence);
        self.decode_state(&mut state, lexica)?;
        Ok(state)
    }

    /// Walks `state` to its end with the best legal label at every step,
    /// then lets the task repair it.
    pub fn decode_state(&self, state: &mut T::State, lexica: &Lexica) -> Result<(), NlpError> {
        let scorer = self.scorer(lexica);
        while !state.is_terminal() {
            let label = scorer.best(state).ok_or(NlpError::NoLegalTransition)?;
            state.apply(label);
        }
        self.task.post_process(state, &scorer);
        Ok(())
    }

    /// Decodes every sentence and scores it against its gold annotation.
    pub fn evaluate(&self, corpus: &[Sentence], lexica: &Lexica) -> Result<<T::State as State>::Eval, NlpError> {
        let mut eval = <T::State as State>::Eval::default();
        for sentence in corpus {
            self.decode(sentence, lexica)?.evaluate(&mut eval);
        }
        Ok(eval)
    }

    /// Number of weights that are not exactly zero.
    pub fn count_non_zero(&self) -> usize {
        self.optimizer.count_non_zero()
    }

    /// Serializes the whole component.
    pub fn to_bytes(&self) -> Result<Vec<u8>, NlpError> {
        Ok(to_bytes(self)?)
    }

    /// Restores a component written by [`OnlineComponent::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NlpError> {
        Ok(from_bytes(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::PartOfSpeechTagger;
    use crate::token::Token;
    use dialog_learn::Method;

    fn corpus() -> Vec<Sentence> {
        vec![Sentence::new(vec![
            Token::new("Dogs").with_pos("NNS"),
            Token::new("bark").with_pos("VBP"),
        ])]
    }

    #[test]
    fn labels_must_line_up_with_the_optimizer() {
        let tagger = PartOfSpeechTagger::from_corpus(&corpus());
        let mut optimizer = OnlineOptimizer::new(Method::perceptron(), 1.0, 0.0).unwrap();
        optimizer.labels_mut().add("VBP");

        let result = OnlineComponent::new(tagger, FeatureTemplate::new(0), optimizer);
        assert!(matches!(
            result,
            Err(NlpError::LabelMismatch { index: 0, ref expected, ref found }) if expected == "NNS" && found == "VBP"
        ));
    }

    #[test]
    fn training_walks_every_token() {
        let tagger = PartOfSpeechTagger::from_corpus(&corpus());
        let optimizer = OnlineOptimizer::new(Method::perceptron(), 1.0, 0.0).unwrap();
        let template = FeatureTemplate::preset("pos0", 0).unwrap();
        let mut component = OnlineComponent::new(tagger, template, optimizer).unwrap();

        let mut roll_in = RollIn::new(Default::default(), 7);
        let steps = component
            .train_sentence(&corpus()[0], &mut roll_in, &Lexica::new())
            .unwrap();
        assert_eq!(steps, 2);
        assert!(component.count_non_zero() > 0);
    }

    #[test]
    fn presets_take_their_cutoff_from_the_hyper_parameters() {
        let hyper = HyperParameter {
            feature_cutoff: 3,
            ..HyperParameter::default()
        };
        let tagger = PartOfSpeechTagger::from_corpus(&corpus());
        let component = OnlineComponent::with_preset(tagger, "pos0", &hyper).unwrap();
        assert_eq!(component.template().feature_map().cutoff(), 3);
        assert_eq!(component.optimizer().labels().len(), 2);

        let tagger = PartOfSpeechTagger::from_corpus(&corpus());
        assert!(matches!(
            OnlineComponent::with_preset(tagger, "pos9", &hyper),
            Err(NlpError::UnknownTemplate(_))
        ));
    }
}
