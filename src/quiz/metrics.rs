use std::collections::BTreeMap;

use crate::quiz::types::{
    AccuracyMap, AttemptMap, Difficulty, QuizAction, SkillKey, SkillPerformance, Subject,
};

#[derive(Debug, Clone)]
pub struct MetricsTracker {
    accuracy_decay: f64,
}

impl MetricsTracker {
    pub fn new(accuracy_decay: f64) -> Self {
        Self {
            accuracy_decay: accuracy_decay.clamp(0.0, 1.0),
        }
    }

    /// Folds one response into the EMA accuracy and attempt counter of its key.
    pub fn update(
        &self,
        accuracies: &mut AccuracyMap,
        attempts: &mut AttemptMap,
        action: &QuizAction,
        correct: bool,
    ) -> SkillPerformance {
        let key = action.key();
        let observed = if correct { 1.0 } else { 0.0 };

        let accuracy = accuracies.entry(key).or_insert(0.0);
        *accuracy = (*accuracy * (1.0 - self.accuracy_decay) + observed * self.accuracy_decay)
            .clamp(0.0, 1.0);

        let count = attempts.entry(key).or_insert(0);
        *count = count.saturating_add(1);

        SkillPerformance {
            accuracy: *accuracy,
            attempts: *count,
        }
    }
}

impl Default for MetricsTracker {
    fn default() -> Self {
        Self::new(0.1)
    }
}

pub fn performance(
    accuracies: &AccuracyMap,
    attempts: &AttemptMap,
    key: SkillKey,
) -> SkillPerformance {
    SkillPerformance {
        accuracy: accuracies.get(&key).copied().unwrap_or(0.0),
        attempts: attempts.get(&key).copied().unwrap_or(0),
    }
}

pub fn subject_performance(
    accuracies: &AccuracyMap,
    attempts: &AttemptMap,
    subject: Subject,
) -> BTreeMap<Difficulty, SkillPerformance> {
    Difficulty::ALL
        .iter()
        .map(|difficulty| {
            (
                *difficulty,
                performance(accuracies, attempts, SkillKey::new(subject, *difficulty)),
            )
        })
        .collect()
}

pub fn total_attempts(attempts: &AttemptMap) -> u64 {
    attempts.values().map(|count| u64::from(*count)).sum()
}

/// Mean over recorded keys only; 0.0 when nothing has been recorded.
pub fn average_accuracy(accuracies: &AccuracyMap) -> f64 {
    if accuracies.is_empty() {
        return 0.0;
    }
    accuracies.values().sum::<f64>() / accuracies.len() as f64
}
