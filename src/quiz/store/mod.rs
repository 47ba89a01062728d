mod memory;
mod sqlite;

use std::future::Future;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::quiz::q_table::QTable;
use crate::quiz::types::{AccuracyMap, AttemptMap, Difficulty, QuizAction};

pub use memory::MemoryRecordStore;
pub use sqlite::SqliteRecordStore;

/// Exploration rate of a record nobody has answered with yet.
pub const INITIAL_EPSILON: f64 = 1.0;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("io error: {0}")]
    Io(String),
}

/// Everything the engine persists for one learner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub accuracies: AccuracyMap,
    pub attempts: AttemptMap,
    pub q_table: QTable,
    pub last_question: Option<QuizAction>,
    #[serde(default)]
    pub current_difficulty: Difficulty,
    pub epsilon: f64,
    pub iteration: u64,
}

impl UserRecord {
    pub fn new(rows: usize, cols: usize, actions: usize) -> Self {
        Self {
            accuracies: AccuracyMap::new(),
            attempts: AttemptMap::new(),
            q_table: QTable::zeros(rows, cols, actions),
            last_question: None,
            current_difficulty: Difficulty::default(),
            epsilon: INITIAL_EPSILON,
            iteration: 0,
        }
    }

    /// Record created by a partial write before any table was stored.
    fn without_table() -> Self {
        Self::new(0, 0, 0)
    }

    /// Fills a never-written table with zeros of the requested shape.
    fn ensure_table(&mut self, rows: usize, cols: usize, actions: usize) {
        if self.q_table.shape() == (0, 0, 0) {
            self.q_table = QTable::zeros(rows, cols, actions);
        }
    }

    pub fn apply(&mut self, update: RecordUpdate) {
        if let Some(accuracies) = update.accuracies {
            self.accuracies = accuracies;
        }
        if let Some(attempts) = update.attempts {
            self.attempts = attempts;
        }
        if let Some(q_table) = update.q_table {
            self.q_table = q_table;
        }
        if let Some(last_question) = update.last_question {
            self.last_question = last_question;
        }
        if let Some(current_difficulty) = update.current_difficulty {
            self.current_difficulty = current_difficulty;
        }
        if let Some(epsilon) = update.epsilon {
            self.epsilon = epsilon;
        }
        if let Some(iteration) = update.iteration {
            self.iteration = iteration;
        }
    }
}

/// Partial write: `None` fields are left unchanged by the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordUpdate {
    pub accuracies: Option<AccuracyMap>,
    pub attempts: Option<AttemptMap>,
    pub q_table: Option<QTable>,
    pub last_question: Option<Option<QuizAction>>,
    pub current_difficulty: Option<Difficulty>,
    pub epsilon: Option<f64>,
    pub iteration: Option<u64>,
}

impl RecordUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accuracies(mut self, accuracies: AccuracyMap) -> Self {
        self.accuracies = Some(accuracies);
        self
    }

    pub fn attempts(mut self, attempts: AttemptMap) -> Self {
        self.attempts = Some(attempts);
        self
    }

    pub fn q_table(mut self, q_table: QTable) -> Self {
        self.q_table = Some(q_table);
        self
    }

    pub fn last_question(mut self, last_question: Option<QuizAction>) -> Self {
        self.last_question = Some(last_question);
        self
    }

    pub fn current_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.current_difficulty = Some(difficulty);
        self
    }

    pub fn epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = Some(epsilon);
        self
    }

    pub fn iteration(mut self, iteration: u64) -> Self {
        self.iteration = Some(iteration);
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub trait UserRecordStore: Send + Sync {
    /// Loads the record, creating the default one on first access.
    fn get(
        &self,
        user_id: &str,
        rows: usize,
        cols: usize,
        actions: usize,
    ) -> impl Future<Output = Result<UserRecord, StoreError>> + Send;

    fn put(
        &self,
        user_id: &str,
        update: RecordUpdate,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn backend(&self) -> &'static str;
}

#[derive(Clone)]
pub enum RecordStore {
    Memory(MemoryRecordStore),
    Sqlite(SqliteRecordStore),
}

impl UserRecordStore for RecordStore {
    async fn get(
        &self,
        user_id: &str,
        rows: usize,
        cols: usize,
        actions: usize,
    ) -> Result<UserRecord, StoreError> {
        match self {
            Self::Memory(store) => store.get(user_id, rows, cols, actions).await,
            Self::Sqlite(store) => store.get(user_id, rows, cols, actions).await,
        }
    }

    async fn put(&self, user_id: &str, update: RecordUpdate) -> Result<(), StoreError> {
        match self {
            Self::Memory(store) => store.put(user_id, update).await,
            Self::Sqlite(store) => store.put(user_id, update).await,
        }
    }

    fn backend(&self) -> &'static str {
        match self {
            Self::Memory(store) => store.backend(),
            Self::Sqlite(store) => store.backend(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::types::Subject;

    #[test]
    fn default_record_is_idle_and_fully_exploring() {
        let record = UserRecord::new(243, 3, 15);
        assert!(record.accuracies.is_empty());
        assert!(record.attempts.is_empty());
        assert!(record.last_question.is_none());
        assert_eq!(record.epsilon, 1.0);
        assert_eq!(record.iteration, 0);
        assert_eq!(record.q_table.shape(), (243, 3, 15));
    }

    #[test]
    fn apply_leaves_unspecified_fields() {
        let mut record = UserRecord::new(3, 3, 15);
        record.epsilon = 0.5;
        record.iteration = 9;

        let pending = QuizAction::new(Subject::Physics, Difficulty::Hard);
        record.apply(RecordUpdate::new().last_question(Some(pending)));

        assert_eq!(record.last_question, Some(pending));
        assert_eq!(record.epsilon, 0.5);
        assert_eq!(record.iteration, 9);

        record.apply(RecordUpdate::new().last_question(None).iteration(10));
        assert_eq!(record.last_question, None);
        assert_eq!(record.iteration, 10);
    }

    #[test]
    fn empty_update_detected() {
        assert!(RecordUpdate::new().is_empty());
        assert!(!RecordUpdate::new().epsilon(0.2).is_empty());
    }

    #[test]
    fn ensure_table_only_fills_missing_table() {
        let mut record = UserRecord::without_table();
        record.ensure_table(243, 3, 15);
        assert_eq!(record.q_table.shape(), (243, 3, 15));

        let mut sized = UserRecord::new(9, 3, 15);
        sized.ensure_table(243, 3, 15);
        assert_eq!(sized.q_table.shape(), (9, 3, 15));
    }
}
