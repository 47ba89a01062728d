use crate::quiz::config::{ThresholdParams, ACCURACY_BINS};
use crate::quiz::types::{Difficulty, QuizState, SkillKey, StateIndex, Subject};

/// Which accuracies feed the row index.
///
/// Both sides of one Bellman update must be encoded with the same mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingMode {
    /// Mixed-radix composition over every subject's mean accuracy.
    AllSubjects,
    /// Discretized accuracy of one subject at the current difficulty.
    Focus(Subject),
}

impl From<Option<Subject>> for EncodingMode {
    fn from(subject: Option<Subject>) -> Self {
        subject.map_or(Self::AllSubjects, Self::Focus)
    }
}

#[derive(Debug, Clone)]
pub struct StateEncoder {
    thresholds: ThresholdParams,
}

impl StateEncoder {
    pub fn new(thresholds: ThresholdParams) -> Self {
        Self { thresholds }
    }

    /// 0 below struggle, 2 at or above mastery, 1 otherwise.
    pub fn discretize_accuracy(&self, accuracy: f64) -> usize {
        if accuracy < self.thresholds.struggle {
            0
        } else if accuracy < self.thresholds.mastery {
            1
        } else {
            2
        }
    }

    pub fn encode(&self, state: &QuizState<'_>, mode: EncodingMode) -> StateIndex {
        let row = match mode {
            EncodingMode::Focus(subject) => self.discretize_accuracy(
                state.accuracy(SkillKey::new(subject, state.current_difficulty)),
            ),
            EncodingMode::AllSubjects => Subject::ALL.iter().fold(0, |row, subject| {
                let bin = self.discretize_accuracy(mean_accuracy(state, *subject));
                row * ACCURACY_BINS + bin
            }),
        };

        StateIndex {
            row,
            col: state.current_difficulty.level(),
        }
    }
}

fn mean_accuracy(state: &QuizState<'_>, subject: Subject) -> f64 {
    let total: f64 = Difficulty::ALL
        .iter()
        .map(|difficulty| state.accuracy(SkillKey::new(subject, *difficulty)))
        .sum();
    total / Difficulty::ALL.len() as f64
}
