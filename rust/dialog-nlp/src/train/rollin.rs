use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::NlpError;

/// How fast training moves from gold transitions to predicted ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RollInConfig {
    /// Factor applied to the gold probability after every epoch, in
    /// `[0, 1]`.
    pub decay: f64,
    /// Number of initial epochs that keep the gold probability fixed.
    pub fixed_stage: usize,
}

impl Default for RollInConfig {
    fn default() -> Self {
        Self {
            decay: 0.95,
            fixed_stage: 0,
        }
    }
}

impl RollInConfig {
    /// Checks every range constraint.
    pub fn validate(&self) -> Result<(), NlpError> {
        if !(0.0..=1.0).contains(&self.decay) {
            return Err(NlpError::InvalidSetting {
                name: "roll_in.decay",
                value: self.decay.to_string(),
            });
        }
        Ok(())
    }
}

/// Chooses, step by step, whether training follows the gold transition or
/// the model's own prediction.
#[derive(Debug, Clone)]
pub struct RollIn {
    gold_probability: f64,
    config: RollInConfig,
    rng: ChaCha8Rng,
}

impl RollIn {
    /// Starts with a gold probability of `1`.
    pub fn new(config: RollInConfig, seed: u64) -> Self {
        Self {
            gold_probability: 1.0,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// The current gold probability.
    pub fn gold_probability(&self) -> f64 {
        self.gold_probability
    }

    /// Epochs left before the gold probability starts to decay.
    pub fn fixed_stage(&self) -> usize {
        self.config.fixed_stage
    }

    /// Draws whether the next transition follows gold.
    pub fn choose_gold(&mut self) -> bool {
        if self.gold_probability <= 0.0 {
            false
        } else if self.gold_probability >= 1.0 {
            true
        } else {
            self.rng.gen_bool(self.gold_probability)
        }
    }

    /// Advances the schedule by one epoch.
    pub fn update(&mut self) {
        if self.config.fixed_stage > 0 {
            self.config.fixed_stage -= 1;
        } else {
            self.gold_probability *= self.config.decay;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn fixed_stage_delays_decay() {
        let mut roll_in = RollIn::new(
            RollInConfig {
                decay: 0.5,
                fixed_stage: 2,
            },
            0,
        );
        roll_in.update();
        roll_in.update();
        assert_eq!(roll_in.gold_probability(), 1.0);
        assert!(roll_in.choose_gold());

        roll_in.update();
        assert_eq!(roll_in.gold_probability(), 0.5);
        roll_in.update();
        assert_eq!(roll_in.gold_probability(), 0.25);
    }

    #[test]
    fn zero_decay_switches_to_predictions() {
        let mut roll_in = RollIn::new(
            RollInConfig {
                decay: 0.0,
                fixed_stage: 0,
            },
            0,
        );
        roll_in.update();
        assert_eq!(roll_in.gold_probability(), 0.0);
        assert!((0..100).all(|_| !roll_in.choose_gold()));
    }

    #[test]
    fn decay_outside_the_unit_interval_is_rejected() {
        let config = RollInConfig {
            decay: 1.5,
            fixed_stage: 0,
        };
        assert!(config.validate().is_err());
        assert!(RollInConfig::default().validate().is_ok());
    }

    proptest! {
        #[test]
        fn gold_probability_never_increases(
            decay in prop_oneof![Just(0.0f64), 0.05f64..=1.0],
            fixed_stage in 0usize..5,
            epochs in 1usize..50,
        ) {
            let mut roll_in = RollIn::new(RollInConfig { decay, fixed_stage }, 1);
            let mut previous = roll_in.gold_probability();
            for epoch in 1..=epochs {
                roll_in.update();
                let current = roll_in.gold_probability();
                prop_assert!(current <= previous);
                prop_assert!(current >= 0.0);
                prop_assert_eq!(current == 0.0, epoch > fixed_stage && decay == 0.0);
                previous = current;
            }
        }
    }
}
