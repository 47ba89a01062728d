use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use super::{RecordUpdate, StoreError, UserRecord, UserRecordStore};
use crate::quiz::types::{AccuracyMap, AttemptMap, Difficulty, QuizAction};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS "quiz_user_records" (
    "user_id" TEXT PRIMARY KEY NOT NULL,
    "accuracies" TEXT NOT NULL,
    "attempts" TEXT NOT NULL,
    "q_table" TEXT NOT NULL,
    "last_question" TEXT,
    "current_difficulty" TEXT NOT NULL DEFAULT 'easy',
    "epsilon" REAL NOT NULL DEFAULT 1.0,
    "iteration" INTEGER NOT NULL DEFAULT 0,
    "updated_at" TEXT NOT NULL
)
"#;

const SELECT_SQL: &str = r#"
SELECT "accuracies", "attempts", "q_table", "last_question",
    "current_difficulty", "epsilon", "iteration"
FROM "quiz_user_records" WHERE "user_id" = ?
"#;

const INSERT_DEFAULT_SQL: &str = r#"
INSERT OR IGNORE INTO "quiz_user_records"
    ("user_id", "accuracies", "attempts", "q_table", "last_question",
     "current_difficulty", "epsilon", "iteration", "updated_at")
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

// NULL leaves the column as stored.
const UPDATE_SQL: &str = r#"
UPDATE "quiz_user_records" SET
    "accuracies" = COALESCE(?, "accuracies"),
    "attempts" = COALESCE(?, "attempts"),
    "q_table" = COALESCE(?, "q_table"),
    "last_question" = CASE WHEN ? THEN ? ELSE "last_question" END,
    "current_difficulty" = COALESCE(?, "current_difficulty"),
    "epsilon" = COALESCE(?, "epsilon"),
    "iteration" = COALESCE(?, "iteration"),
    "updated_at" = ?
WHERE "user_id" = ?
"#;

#[derive(Clone)]
pub struct SqliteRecordStore {
    pool: SqlitePool,
}

impl SqliteRecordStore {
    /// Accepts either a `sqlite:` URL or a plain file path.
    pub async fn connect(target: &str) -> Result<Self, StoreError> {
        let in_memory = target.contains(":memory:");
        let url = if target.starts_with("sqlite:") {
            target.to_string()
        } else {
            if let Some(parent) = Path::new(target).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| StoreError::Io(e.to_string()))?;
                }
            }
            format!("sqlite:{target}?mode=rwc")
        };

        let options = SqliteConnectOptions::from_str(&url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(30));

        // Each connection to :memory: is its own database.
        let max_connections = if in_memory { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch(&self, user_id: &str) -> Result<Option<UserRecord>, StoreError> {
        sqlx::query(SELECT_SQL)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(row_to_record)
            .transpose()
    }

    /// Creates `record` unless a row already exists; an existing row always wins.
    async fn insert_default(
        &self,
        user_id: &str,
        record: &UserRecord,
    ) -> Result<(), StoreError> {
        let last_question = record
            .last_question
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(INSERT_DEFAULT_SQL)
            .bind(user_id)
            .bind(serde_json::to_string(&record.accuracies)?)
            .bind(serde_json::to_string(&record.attempts)?)
            .bind(serde_json::to_string(&record.q_table)?)
            .bind(last_question)
            .bind(record.current_difficulty.as_str())
            .bind(record.epsilon)
            .bind(i64::try_from(record.iteration).unwrap_or(i64::MAX))
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Applies the update in a single statement; returns whether a row matched.
    async fn update_columns(
        &self,
        user_id: &str,
        update: &RecordUpdate,
    ) -> Result<bool, StoreError> {
        let accuracies = update
            .accuracies
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let attempts = update
            .attempts
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let q_table = update
            .q_table
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let last_question = update
            .last_question
            .as_ref()
            .and_then(|pending| pending.as_ref())
            .map(serde_json::to_string)
            .transpose()?;
        let iteration = update
            .iteration
            .map(|iteration| i64::try_from(iteration).unwrap_or(i64::MAX));

        let result = sqlx::query(UPDATE_SQL)
            .bind(accuracies)
            .bind(attempts)
            .bind(q_table)
            .bind(update.last_question.is_some())
            .bind(last_question)
            .bind(update.current_difficulty.map(|difficulty| difficulty.as_str()))
            .bind(update.epsilon)
            .bind(iteration)
            .bind(chrono::Utc::now().to_rfc3339())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl UserRecordStore for SqliteRecordStore {
    async fn get(
        &self,
        user_id: &str,
        rows: usize,
        cols: usize,
        actions: usize,
    ) -> Result<UserRecord, StoreError> {
        if let Some(mut record) = self.fetch(user_id).await? {
            record.ensure_table(rows, cols, actions);
            return Ok(record);
        }

        self.insert_default(user_id, &UserRecord::new(rows, cols, actions))
            .await?;
        tracing::debug!(user_id, "created default quiz record");

        let mut record = self
            .fetch(user_id)
            .await?
            .ok_or_else(|| StoreError::Decode(format!("record for {user_id} vanished")))?;
        record.ensure_table(rows, cols, actions);
        Ok(record)
    }

    async fn put(&self, user_id: &str, update: RecordUpdate) -> Result<(), StoreError> {
        if update.is_empty() {
            return Ok(());
        }

        if !self.update_columns(user_id, &update).await? {
            self.insert_default(user_id, &UserRecord::without_table())
                .await?;
            self.update_columns(user_id, &update).await?;
        }
        Ok(())
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}

fn row_to_record(row: &SqliteRow) -> Result<UserRecord, StoreError> {
    let accuracies: String = row.try_get("accuracies")?;
    let attempts: String = row.try_get("attempts")?;
    let q_table: String = row.try_get("q_table")?;
    let last_question: Option<String> = row.try_get("last_question")?;
    let current_difficulty: String = row.try_get("current_difficulty")?;
    let epsilon: f64 = row.try_get("epsilon")?;
    let iteration: i64 = row.try_get("iteration")?;

    Ok(UserRecord {
        accuracies: serde_json::from_str::<AccuracyMap>(&accuracies)?,
        attempts: serde_json::from_str::<AttemptMap>(&attempts)?,
        q_table: serde_json::from_str(&q_table)?,
        last_question: last_question
            .as_deref()
            .map(serde_json::from_str::<QuizAction>)
            .transpose()?,
        current_difficulty: current_difficulty
            .parse::<Difficulty>()
            .map_err(|e| StoreError::Decode(e.to_string()))?,
        epsilon,
        iteration: u64::try_from(iteration).unwrap_or(0),
    })
}
