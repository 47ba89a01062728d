use serde::{Deserialize, Serialize};

use crate::quiz::config::LearningParams;
use crate::quiz::types::StateIndex;

/// Dense (rows, cols, actions) table stored row-major in one buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QTable {
    rows: usize,
    cols: usize,
    actions: usize,
    values: Vec<f64>,
}

impl QTable {
    pub fn zeros(rows: usize, cols: usize, actions: usize) -> Self {
        Self {
            rows,
            cols,
            actions,
            values: vec![0.0; rows * cols * actions],
        }
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.rows, self.cols, self.actions)
    }

    /// True when the declared shape matches the buffer and the expected shape.
    pub fn has_shape(&self, shape: (usize, usize, usize)) -> bool {
        self.shape() == shape && self.values.len() == shape.0 * shape.1 * shape.2
    }

    pub fn contains(&self, state: StateIndex) -> bool {
        state.row < self.rows && state.col < self.cols
    }

    fn offset(&self, state: StateIndex) -> usize {
        debug_assert!(self.contains(state));
        (state.row * self.cols + state.col) * self.actions
    }

    pub fn action_values(&self, state: StateIndex) -> &[f64] {
        let start = self.offset(state);
        &self.values[start..start + self.actions]
    }

    pub fn get(&self, state: StateIndex, action: usize) -> f64 {
        self.action_values(state)[action]
    }

    pub fn set(&mut self, state: StateIndex, action: usize, value: f64) {
        let offset = self.offset(state);
        self.values[offset + action] = value;
    }

    pub fn max_value(&self, state: StateIndex) -> f64 {
        self.action_values(state)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Q(s,a) += α [r + γ max_a' Q(s',a') - Q(s,a)]; returns the new value.
    pub fn bellman_update(
        &mut self,
        params: &LearningParams,
        state: StateIndex,
        action: usize,
        reward: f64,
        next_state: StateIndex,
    ) -> f64 {
        let current = self.get(state, action);
        let max_next = self.max_value(next_state);
        let td_error = reward + params.discount_factor * max_next - current;
        let updated = current + params.learning_rate * td_error;
        self.set(state, action, updated);
        updated
    }
}
