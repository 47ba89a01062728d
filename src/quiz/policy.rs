use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::quiz::action::{self, ACTION_COUNT};
use crate::quiz::config::ExplorationParams;
use crate::quiz::q_table::QTable;
use crate::quiz::types::{Difficulty, QuizAction, StateIndex, Subject};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub action: QuizAction,
    pub exploration: bool,
}

#[derive(Debug, Clone)]
pub struct EpsilonGreedyPolicy {
    params: ExplorationParams,
}

impl EpsilonGreedyPolicy {
    pub fn new(params: ExplorationParams) -> Self {
        Self { params }
    }

    pub fn select<R: Rng>(
        &self,
        rng: &mut R,
        table: &QTable,
        state: StateIndex,
        current_subject: Option<Subject>,
        epsilon: f64,
    ) -> Selection {
        if rng.random::<f64>() < epsilon {
            let subject = match current_subject {
                Some(subject) => subject,
                None => Subject::ALL[rng.random_range(0..Subject::ALL.len())],
            };
            let difficulty = Difficulty::ALL[rng.random_range(0..Difficulty::ALL.len())];
            return Selection {
                action: QuizAction::new(subject, difficulty),
                exploration: true,
            };
        }

        let values = table.action_values(state);
        let candidates = match current_subject {
            Some(subject) => action::subject_actions(subject),
            None => 0..ACTION_COUNT.min(values.len()),
        };
        let best = argmax_first(values, candidates);

        Selection {
            action: action::from_index(best).unwrap_or(QuizAction::new(
                current_subject.unwrap_or(Subject::ALL[0]),
                Difficulty::default(),
            )),
            exploration: false,
        }
    }

    /// Multiplicative decay floored at the configured minimum.
    pub fn decay(&self, epsilon: f64) -> f64 {
        (epsilon * self.params.epsilon_decay).clamp(self.params.min_epsilon, 1.0)
    }
}

impl Default for EpsilonGreedyPolicy {
    fn default() -> Self {
        Self::new(ExplorationParams::default())
    }
}

/// Strictly-greater scan, so ties resolve to the lowest index.
fn argmax_first(values: &[f64], candidates: std::ops::Range<usize>) -> usize {
    let mut best_index = candidates.start;
    let mut best_value = f64::NEG_INFINITY;
    for index in candidates {
        if values[index] > best_value {
            best_value = values[index];
            best_index = index;
        }
    }
    best_index
}
