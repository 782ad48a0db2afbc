//! Hyper-parameters supplied by the caller.

use serde::{Deserialize, Serialize};

use crate::{LearnError, Method, OnlineOptimizer, RegularizedDualAveraging};

/// Which update strategy to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerKind {
    /// [`Method::Perceptron`].
    Perceptron,
    /// [`Method::AdaGrad`].
    #[default]
    AdaGrad,
    /// [`Method::AdaGradMiniBatch`].
    AdaGradMiniBatch,
    /// [`Method::AdaDeltaMiniBatch`].
    AdaDeltaMiniBatch,
    /// [`Method::Softmax`].
    Softmax,
}

/// Plain numeric settings of one optimizer and its feature map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HyperParameter {
    /// Update strategy.
    pub optimizer: OptimizerKind,
    /// Base learning rate, strictly positive.
    pub learning_rate: f32,
    /// Value of the constant bias feature; `0` disables it.
    pub bias: f32,
    /// AdaDelta decay, in `[0, 1]`.
    pub decay: f32,
    /// L1 strength; `None` trains without regularization.
    pub l1_regularization: Option<f32>,
    /// Sentences per mini-batch flush, at least one.
    pub batch_size: usize,
    /// A feature key needs more than this many occurrences to get an index.
    pub feature_cutoff: usize,
}

impl Default for HyperParameter {
    fn default() -> Self {
        Self {
            optimizer: OptimizerKind::default(),
            learning_rate: 0.02,
            bias: 0.0,
            decay: 0.4,
            l1_regularization: None,
            batch_size: 1,
            feature_cutoff: 0,
        }
    }
}

impl HyperParameter {
    /// Checks every range constraint.
    pub fn validate(&self) -> Result<(), LearnError> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(LearnError::InvalidLearningRate(self.learning_rate));
        }
        if !self.bias.is_finite() || self.bias < 0.0 {
            return Err(invalid("bias", self.bias));
        }
        if !(0.0..=1.0).contains(&self.decay) {
            return Err(invalid("decay", self.decay));
        }
        if let Some(rate) = self.l1_regularization {
            if !rate.is_finite() || rate < 0.0 {
                return Err(invalid("l1_regularization", rate));
            }
        }
        if self.batch_size == 0 {
            return Err(invalid("batch_size", self.batch_size));
        }
        Ok(())
    }

    /// Builds a fresh optimizer.
    pub fn optimizer(&self) -> Result<OnlineOptimizer, LearnError> {
        self.validate()?;

        let method = match self.optimizer {
            OptimizerKind::Perceptron => Method::perceptron(),
            OptimizerKind::AdaGrad => Method::ada_grad(),
            OptimizerKind::AdaGradMiniBatch => Method::ada_grad_mini_batch(),
            OptimizerKind::AdaDeltaMiniBatch => Method::ada_delta_mini_batch(self.decay)?,
            OptimizerKind::Softmax => Method::softmax(),
        };

        let optimizer = OnlineOptimizer::new(method, self.learning_rate, self.bias)?;
        Ok(match self.l1_regularization {
            Some(rate) => optimizer.with_regularizer(RegularizedDualAveraging::new(rate)?),
            None => optimizer,
        })
    }
}

fn invalid(name: &'static str, value: impl ToString) -> LearnError {
    LearnError::InvalidHyperParameter {
        name,
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        HyperParameter::default().validate().unwrap();
    }

    #[test]
    fn it_rejects_out_of_range_values() {
        let zero_rate = HyperParameter {
            learning_rate: 0.0,
            ..HyperParameter::default()
        };
        assert!(matches!(
            zero_rate.optimizer(),
            Err(LearnError::InvalidLearningRate(_))
        ));

        let empty_batch = HyperParameter {
            batch_size: 0,
            ..HyperParameter::default()
        };
        assert!(empty_batch.validate().is_err());

        let negative_l1 = HyperParameter {
            l1_regularization: Some(-1.0),
            ..HyperParameter::default()
        };
        assert!(negative_l1.validate().is_err());
    }

    #[test]
    fn it_builds_the_requested_method() {
        let hyper = HyperParameter {
            optimizer: OptimizerKind::AdaDeltaMiniBatch,
            l1_regularization: Some(0.001),
            ..HyperParameter::default()
        };
        let optimizer = hyper.optimizer().unwrap();
        assert!(optimizer.method().is_mini_batch());
        assert_eq!(optimizer.regularizer().map(|r| r.rate()), Some(0.001));
    }
}
