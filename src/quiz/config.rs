use serde::{Deserialize, Serialize};

use crate::quiz::types::{Difficulty, Subject};

/// Number of discretized accuracy bins per subject.
pub const ACCURACY_BINS: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearningParams {
    pub learning_rate: f64,
    pub discount_factor: f64,
}

impl Default for LearningParams {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplorationParams {
    pub min_epsilon: f64,
    pub epsilon_decay: f64,
}

impl Default for ExplorationParams {
    fn default() -> Self {
        Self {
            min_epsilon: 0.1,
            epsilon_decay: 0.995,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdParams {
    pub mastery: f64,
    pub struggle: f64,
    pub minimum_attempts: u32,
}

impl Default for ThresholdParams {
    fn default() -> Self {
        Self {
            mastery: 0.7,
            struggle: 0.4,
            minimum_attempts: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardParams {
    pub correct_base: f64,
    pub incorrect_base: f64,
    pub struggle_penalty_ratio: f64,
    pub exploration_bonus: f64,
}

impl Default for RewardParams {
    fn default() -> Self {
        Self {
            correct_base: 1.0,
            incorrect_base: -0.5,
            struggle_penalty_ratio: 0.5,
            exploration_bonus: 0.2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizConfig {
    pub learning: LearningParams,
    pub exploration: ExplorationParams,
    pub thresholds: ThresholdParams,
    pub reward: RewardParams,
    pub accuracy_decay: f64,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            learning: LearningParams::default(),
            exploration: ExplorationParams::default(),
            thresholds: ThresholdParams::default(),
            reward: RewardParams::default(),
            accuracy_decay: 0.1,
        }
    }
}

impl QuizConfig {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(val) = env_f64("QUIZ_LEARNING_RATE") {
            config.learning.learning_rate = val.clamp(0.0, 1.0);
        }
        if let Some(val) = env_f64("QUIZ_DISCOUNT_FACTOR") {
            config.learning.discount_factor = val.clamp(0.0, 1.0);
        }
        if let Some(val) = env_f64("QUIZ_EPSILON_DECAY") {
            config.exploration.epsilon_decay = val.clamp(0.0, 1.0);
        }
        if let Some(val) = env_f64("QUIZ_MIN_EPSILON") {
            config.exploration.min_epsilon = val.clamp(0.0, 1.0);
        }

        config
    }

    /// Q-table rows: one mixed-radix digit per subject.
    pub fn state_rows(&self) -> usize {
        ACCURACY_BINS.pow(Subject::ALL.len() as u32)
    }

    pub fn state_cols(&self) -> usize {
        Difficulty::ALL.len()
    }

    pub fn action_space(&self) -> usize {
        Subject::ALL.len() * Difficulty::ALL.len()
    }

    pub fn table_shape(&self) -> (usize, usize, usize) {
        (self.state_rows(), self.state_cols(), self.action_space())
    }
}

fn env_f64(key: &str) -> Option<f64> {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
}
