use serde::{Deserialize, Serialize};

use crate::quiz::config::{RewardParams, ThresholdParams};
use crate::quiz::types::{QuizAction, QuizState};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardBreakdown {
    pub base: f64,
    pub difficulty_adjustment: f64,
    pub exploration_bonus: f64,
    pub total: f64,
}

#[derive(Debug, Clone)]
pub struct RewardFunction {
    params: RewardParams,
    thresholds: ThresholdParams,
}

impl RewardFunction {
    pub fn new(params: RewardParams, thresholds: ThresholdParams) -> Self {
        Self { params, thresholds }
    }

    /// Scores a response against the learner's history *before* it is recorded.
    pub fn compute(
        &self,
        state: &QuizState<'_>,
        action: &QuizAction,
        correct: bool,
    ) -> RewardBreakdown {
        let key = action.key();
        let accuracy = state.accuracy(key);
        let attempts = state.attempts_for(key);
        let multiplier = action.difficulty.multiplier();

        let base = if correct {
            self.params.correct_base
        } else {
            self.params.incorrect_base
        } * multiplier;

        let mut difficulty_adjustment = 0.0;
        if correct
            && !action.difficulty.is_highest()
            && accuracy >= self.thresholds.mastery
            && attempts >= self.thresholds.minimum_attempts
        {
            difficulty_adjustment += multiplier;
        }
        if !correct && accuracy < self.thresholds.struggle && !action.difficulty.is_lowest() {
            difficulty_adjustment -= multiplier * self.params.struggle_penalty_ratio;
        }

        let exploration_bonus = if attempts < self.thresholds.minimum_attempts {
            self.params.exploration_bonus
        } else {
            0.0
        };

        RewardBreakdown {
            base,
            difficulty_adjustment,
            exploration_bonus,
            total: base + difficulty_adjustment + exploration_bonus,
        }
    }
}

impl Default for RewardFunction {
    fn default() -> Self {
        Self::new(RewardParams::default(), ThresholdParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::types::{AccuracyMap, AttemptMap, Difficulty, SkillKey, Subject};

    const EPS: f64 = 1e-12;

    fn history(key: SkillKey, accuracy: f64, attempts: u32) -> (AccuracyMap, AttemptMap) {
        let mut accuracies = AccuracyMap::new();
        let mut counts = AttemptMap::new();
        accuracies.insert(key, accuracy);
        counts.insert(key, attempts);
        (accuracies, counts)
    }

    #[test]
    fn fresh_correct_gets_base_plus_exploration_bonus() {
        let accuracies = AccuracyMap::new();
        let attempts = AttemptMap::new();
        let state = QuizState::new(&accuracies, &attempts, Difficulty::Easy);
        let action = QuizAction::new(Subject::Biology, Difficulty::Medium);

        let reward = RewardFunction::default().compute(&state, &action, true);
        assert!((reward.base - 1.5).abs() < EPS);
        assert_eq!(reward.difficulty_adjustment, 0.0);
        assert!((reward.exploration_bonus - 0.2).abs() < EPS);
        assert!((reward.total - 1.7).abs() < EPS);
    }

    #[test]
    fn fresh_incorrect_at_medium_is_penalised_for_struggle() {
        let accuracies = AccuracyMap::new();
        let attempts = AttemptMap::new();
        let state = QuizState::new(&accuracies, &attempts, Difficulty::Medium);
        let action = QuizAction::new(Subject::Chemistry, Difficulty::Medium);

        let reward = RewardFunction::default().compute(&state, &action, false);
        assert!((reward.base + 0.75).abs() < EPS);
        assert!((reward.difficulty_adjustment + 0.75).abs() < EPS);
        assert!((reward.total - (-0.75 - 0.75 + 0.2)).abs() < EPS);
    }

    #[test]
    fn struggle_penalty_skips_lowest_difficulty() {
        let key = SkillKey::new(Subject::English, Difficulty::Easy);
        let (accuracies, attempts) = history(key, 0.1, 10);
        let state = QuizState::new(&accuracies, &attempts, Difficulty::Easy);
        let action = QuizAction::new(Subject::English, Difficulty::Easy);

        let reward = RewardFunction::default().compute(&state, &action, false);
        assert_eq!(reward.difficulty_adjustment, 0.0);
        assert_eq!(reward.exploration_bonus, 0.0);
        assert!((reward.total + 0.5).abs() < EPS);
    }

    #[test]
    fn mastery_bonus_pushes_toward_escalation() {
        let key = SkillKey::new(Subject::Physics, Difficulty::Easy);
        let (accuracies, attempts) = history(key, 0.72, 5);
        let state = QuizState::new(&accuracies, &attempts, Difficulty::Easy);
        let action = QuizAction::new(Subject::Physics, Difficulty::Easy);

        let reward = RewardFunction::default().compute(&state, &action, true);
        assert!(reward.difficulty_adjustment > 0.0);
        assert!(reward.total > reward.base);
        assert!((reward.total - 2.0).abs() < EPS);
    }

    #[test]
    fn mastery_bonus_needs_minimum_attempts() {
        let key = SkillKey::new(Subject::Physics, Difficulty::Easy);
        let (accuracies, attempts) = history(key, 0.95, 4);
        let state = QuizState::new(&accuracies, &attempts, Difficulty::Easy);
        let action = QuizAction::new(Subject::Physics, Difficulty::Easy);

        let reward = RewardFunction::default().compute(&state, &action, true);
        assert_eq!(reward.difficulty_adjustment, 0.0);
        assert!((reward.exploration_bonus - 0.2).abs() < EPS);
    }

    #[test]
    fn no_mastery_bonus_at_hardest_level() {
        let key = SkillKey::new(Subject::Logical, Difficulty::Hard);
        let (accuracies, attempts) = history(key, 0.9, 20);
        let state = QuizState::new(&accuracies, &attempts, Difficulty::Hard);
        let action = QuizAction::new(Subject::Logical, Difficulty::Hard);

        let reward = RewardFunction::default().compute(&state, &action, true);
        assert_eq!(reward.difficulty_adjustment, 0.0);
        assert!((reward.total - 2.0).abs() < EPS);
    }
}
