//! Scores a decoded state against its gold annotation.

use std::fmt;

/// Accumulates agreement between predictions and gold over many states.
pub trait Evaluator: Default + fmt::Display {
    /// The headline score in percent.
    fn score(&self) -> f64;

    /// Forgets every count.
    fn clear(&mut self) {
        *self = Self::default();
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        100.0 * count as f64 / total as f64
    }
}

/// Labeled and unlabeled attachment scores.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttachmentScore {
    /// Tokens with the gold head and relation.
    pub las: usize,
    /// Tokens with the gold head.
    pub uas: usize,
    /// Tokens with a gold head.
    pub total: usize,
}

impl AttachmentScore {
    /// Counts one token.
    pub fn add(&mut self, head_matches: bool, label_matches: bool) {
        self.total += 1;
        if head_matches {
            self.uas += 1;
            if label_matches {
                self.las += 1;
            }
        }
    }

    /// Labeled attachment score in percent.
    pub fn labeled(&self) -> f64 {
        percent(self.las, self.total)
    }

    /// Unlabeled attachment score in percent.
    pub fn unlabeled(&self) -> f64 {
        percent(self.uas, self.total)
    }
}

impl Evaluator for AttachmentScore {
    fn score(&self) -> f64 {
        self.labeled()
    }
}

impl fmt::Display for AttachmentScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "LAS: {:.2} ({}/{}), UAS: {:.2} ({}/{})",
            self.labeled(),
            self.las,
            self.total,
            self.unlabeled(),
            self.uas,
            self.total
        )
    }
}

/// Plain accuracy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Accuracy {
    /// Correct predictions.
    pub correct: usize,
    /// All predictions.
    pub total: usize,
}

impl Accuracy {
    /// Counts one prediction.
    pub fn add(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        }
    }
}

impl Evaluator for Accuracy {
    fn score(&self) -> f64 {
        percent(self.correct, self.total)
    }
}

impl fmt::Display for Accuracy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ACC: {:.2} ({}/{})", self.score(), self.correct, self.total)
    }
}
