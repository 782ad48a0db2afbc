use dialog_learn::HyperParameter;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{RollIn, RollInConfig};
use crate::component::{OnlineComponent, Task};
use crate::error::NlpError;
use crate::eval::Evaluator;
use crate::lexicon::Lexica;
use crate::token::Sentence;

/// Epoch budget and schedule of a training run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainInfo {
    /// Upper bound on the number of epochs, at least one.
    pub max_epochs: usize,
    /// Stop after this many epochs without improvement.
    pub patience: Option<usize>,
    /// Sentences between mini-batch flushes, at least one.
    pub batch_size: usize,
    /// Gold-to-prediction schedule.
    pub roll_in: RollInConfig,
    /// Seed of the shuffling and roll-in draws.
    pub seed: u64,
}

impl Default for TrainInfo {
    fn default() -> Self {
        Self {
            max_epochs: 50,
            patience: None,
            batch_size: 1,
            roll_in: RollInConfig::default(),
            seed: 0,
        }
    }
}

impl From<&HyperParameter> for TrainInfo {
    /// Default schedule with the mini-batch size of `hyper`.
    fn from(hyper: &HyperParameter) -> Self {
        Self {
            batch_size: hyper.batch_size,
            ..Self::default()
        }
    }
}

impl TrainInfo {
    /// Checks every range constraint.
    pub fn validate(&self) -> Result<(), NlpError> {
        if self.max_epochs == 0 {
            return Err(invalid("max_epochs", self.max_epochs));
        }
        if self.batch_size == 0 {
            return Err(invalid("batch_size", self.batch_size));
        }
        if self.patience == Some(0) {
            return Err(invalid("patience", 0));
        }
        self.roll_in.validate()
    }
}

fn invalid(name: &'static str, value: impl ToString) -> NlpError {
    NlpError::InvalidSetting {
        name,
        value: value.to_string(),
    }
}

/// What happened in one epoch.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochSummary {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Gold probability used during the epoch.
    pub gold_probability: f64,
    /// Held-out score after the epoch.
    pub score: f64,
    /// Non-zero weights after the epoch.
    pub non_zero: usize,
    /// `true` when this epoch produced the best model so far.
    pub improved: bool,
}

/// Outcome of [`Trainer::train`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainReport {
    /// Every epoch that ran.
    pub epochs: Vec<EpochSummary>,
    /// Epoch of the retained model.
    pub best_epoch: usize,
    /// Score of the retained model.
    pub best_score: f64,
}

/// Runs epochs of online training with model selection on held-out data.
#[derive(Debug, Clone)]
pub struct Trainer {
    info: TrainInfo,
}

impl Trainer {
    /// Creates a trainer, rejecting invalid settings.
    pub fn new(info: TrainInfo) -> Result<Self, NlpError> {
        info.validate()?;
        Ok(Self { info })
    }

    /// The settings.
    pub fn info(&self) -> &TrainInfo {
        &self.info
    }

    /// Trains `component` on `train` and leaves it holding the weights that
    /// scored best on `dev`. Ties go to the sparser model. An empty `dev`
    /// selects on the training data.
    pub fn train<T>(
        &self,
        component: &mut OnlineComponent<T>,
        train: &[Sentence],
        dev: &[Sentence],
        lexica: &Lexica,
    ) -> Result<TrainReport, NlpError>
    where
        T: Task + Serialize + DeserializeOwned,
    {
        for sentence in train {
            sentence.validate()?;
            component.task().check(sentence)?;
        }

        let held_out = if dev.is_empty() { train } else { dev };
        let mut roll_in = RollIn::new(self.info.roll_in, self.info.seed);
        let mut rng = ChaCha8Rng::seed_from_u64(self.info.seed.wrapping_add(1));
        let mut order: Vec<usize> = (0..train.len()).collect();

        let mut report = TrainReport::default();
        let mut best: Option<(f64, usize, OnlineComponent<T>)> = None;
        let mut stale = 0;

        for epoch in 1..=self.info.max_epochs {
            order.shuffle(&mut rng);
            component.clear_feature_counts();

            let mut steps = 0;
            for (position, index) in order.iter().enumerate() {
                steps += component.train_sentence(&train[*index], &mut roll_in, lexica)?;
                if (position + 1) % self.info.batch_size == 0 {
                    component.update_mini_batch();
                }
            }
            if train.len() % self.info.batch_size != 0 {
                component.update_mini_batch();
            }

            let eval = component.evaluate(held_out, lexica)?;
            let score = eval.score();
            let non_zero = component.count_non_zero();
            let improved = match &best {
                None => true,
                Some((best_score, best_non_zero, _)) => {
                    score > *best_score || (score == *best_score && non_zero < *best_non_zero)
                }
            };

            info!(
                epoch,
                gold_probability = roll_in.gold_probability(),
                steps,
                non_zero,
                labels = component.optimizer().labels().len(),
                features = component.template().feature_map().size(),
                improved,
                "{eval}"
            );

            report.epochs.push(EpochSummary {
                epoch,
                gold_probability: roll_in.gold_probability(),
                score,
                non_zero,
                improved,
            });

            if improved {
                best = Some((score, non_zero, component.clone()));
                report.best_epoch = epoch;
                report.best_score = score;
                stale = 0;
            } else {
                stale += 1;
            }

            roll_in.update();

            if self.info.patience.is_some_and(|patience| stale >= patience) {
                info!(epoch, stale, "Stopping early");
                break;
            }
        }

        if let Some((_, _, snapshot)) = best {
            info!(epoch = report.best_epoch, score = report.best_score, "Keeping the best model");
            *component = snapshot;
        }
        Ok(report)
    }
}
