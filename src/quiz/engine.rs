use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tokio::sync::Mutex as AsyncMutex;

use crate::quiz::action;
use crate::quiz::config::QuizConfig;
use crate::quiz::encoder::{EncodingMode, StateEncoder};
use crate::quiz::error::QuizError;
use crate::quiz::metrics::{self, MetricsTracker};
use crate::quiz::policy::EpsilonGreedyPolicy;
use crate::quiz::reward::{RewardBreakdown, RewardFunction};
use crate::quiz::store::{RecordUpdate, UserRecord, UserRecordStore};
use crate::quiz::types::{Difficulty, QuizAction, QuizState, SkillPerformance, Subject};

const LOCK_PRUNE_THRESHOLD: usize = 1024;

/// Encoding used on both sides of every update and for selection.
const ENCODING: EncodingMode = EncodingMode::AllSubjects;

#[derive(Debug, Clone, Serialize)]
pub struct NextQuestion {
    pub action: QuizAction,
    pub exploration: bool,
    pub current_accuracy: f64,
    pub total_attempts: u32,
    pub epsilon: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedbackOutcome {
    pub action: QuizAction,
    pub reward: RewardBreakdown,
    pub new_accuracy: f64,
    pub total_attempts: u32,
    pub subject_accuracies: BTreeMap<Difficulty, f64>,
    pub q_value: f64,
    pub epsilon: f64,
    pub iteration: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillProgress {
    pub accuracy: f64,
    pub attempts: u32,
    pub mastered: bool,
}

pub type SubjectStats = BTreeMap<Subject, BTreeMap<Difficulty, SkillPerformance>>;

#[derive(Debug, Clone, Serialize)]
pub struct ProgressReport {
    pub subjects: BTreeMap<Subject, BTreeMap<Difficulty, SkillProgress>>,
    pub total_attempts: u64,
    pub average_accuracy: f64,
}

pub struct QuizEngine<S> {
    config: QuizConfig,
    store: S,
    encoder: StateEncoder,
    reward: RewardFunction,
    policy: EpsilonGreedyPolicy,
    metrics: MetricsTracker,
    rng: Mutex<StdRng>,
    user_locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl<S: UserRecordStore> QuizEngine<S> {
    pub fn new(config: QuizConfig, store: S) -> Self {
        Self::with_rng(config, store, StdRng::from_os_rng())
    }

    pub fn with_seed(config: QuizConfig, store: S, seed: u64) -> Self {
        Self::with_rng(config, store, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(config: QuizConfig, store: S, rng: StdRng) -> Self {
        Self {
            encoder: StateEncoder::new(config.thresholds.clone()),
            reward: RewardFunction::new(config.reward.clone(), config.thresholds.clone()),
            policy: EpsilonGreedyPolicy::new(config.exploration.clone()),
            metrics: MetricsTracker::new(config.accuracy_decay),
            rng: Mutex::new(rng),
            user_locks: Mutex::new(HashMap::new()),
            config,
            store,
        }
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Picks the next question and stores it as pending, replacing any earlier one.
    pub async fn next_question(
        &self,
        user_id: &str,
        current_subject: Option<Subject>,
    ) -> Result<NextQuestion, QuizError> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let record = self.load(user_id).await?;
        let current_difficulty = record
            .last_question
            .map(|pending| pending.difficulty)
            .unwrap_or(record.current_difficulty);
        let state = QuizState::new(&record.accuracies, &record.attempts, current_difficulty);
        let index = self.encoder.encode(&state, ENCODING);

        let selection = {
            let mut rng = self.rng.lock();
            self.policy.select(
                &mut *rng,
                &record.q_table,
                index,
                current_subject,
                record.epsilon,
            )
        };

        self.store
            .put(
                user_id,
                RecordUpdate::new().last_question(Some(selection.action)),
            )
            .await
            .inspect_err(|err| {
                tracing::warn!(user_id, error = %err, "failed to save pending question")
            })?;

        let performance = metrics::performance(
            &record.accuracies,
            &record.attempts,
            selection.action.key(),
        );

        tracing::debug!(
            user_id,
            subject = %selection.action.subject,
            difficulty = %selection.action.difficulty,
            exploration = selection.exploration,
            epsilon = record.epsilon,
            row = index.row,
            col = index.col,
            "selected next question"
        );

        Ok(NextQuestion {
            action: selection.action,
            exploration: selection.exploration,
            current_accuracy: performance.accuracy,
            total_attempts: performance.attempts,
            epsilon: record.epsilon,
        })
    }

    /// Scores the pending question, updates metrics and the Q-table, and clears it.
    pub async fn submit_feedback(
        &self,
        user_id: &str,
        correct: bool,
    ) -> Result<FeedbackOutcome, QuizError> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let mut record = self.load(user_id).await?;
        let action = record
            .last_question
            .ok_or_else(|| QuizError::MissingPriorQuestion {
                user_id: user_id.to_string(),
            })?;

        let state = QuizState::new(&record.accuracies, &record.attempts, action.difficulty);
        let current_index = self.encoder.encode(&state, ENCODING);
        let reward = self.reward.compute(&state, &action, correct);

        let performance = self.metrics.update(
            &mut record.accuracies,
            &mut record.attempts,
            &action,
            correct,
        );

        let next_state = QuizState::new(&record.accuracies, &record.attempts, action.difficulty);
        let next_index = self.encoder.encode(&next_state, ENCODING);

        let q_value = record.q_table.bellman_update(
            &self.config.learning,
            current_index,
            action::to_index(&action),
            reward.total,
            next_index,
        );

        let epsilon = self.policy.decay(record.epsilon);
        let iteration = record.iteration.saturating_add(1);
        let subject_accuracies =
            metrics::subject_performance(&record.accuracies, &record.attempts, action.subject)
                .into_iter()
                .map(|(difficulty, perf)| (difficulty, perf.accuracy))
                .collect();

        self.store
            .put(
                user_id,
                RecordUpdate::new()
                    .accuracies(record.accuracies)
                    .attempts(record.attempts)
                    .q_table(record.q_table)
                    .last_question(None)
                    .current_difficulty(action.difficulty)
                    .epsilon(epsilon)
                    .iteration(iteration),
            )
            .await
            .inspect_err(|err| {
                tracing::warn!(user_id, error = %err, "failed to save feedback")
            })?;

        tracing::debug!(
            user_id,
            subject = %action.subject,
            difficulty = %action.difficulty,
            correct,
            reward = reward.total,
            new_accuracy = performance.accuracy,
            epsilon,
            "applied feedback"
        );

        Ok(FeedbackOutcome {
            action,
            reward,
            new_accuracy: performance.accuracy,
            total_attempts: performance.attempts,
            subject_accuracies,
            q_value,
            epsilon,
            iteration,
        })
    }

    pub async fn stats(&self, user_id: &str) -> Result<SubjectStats, QuizError> {
        let record = self.load_locked(user_id).await?;
        Ok(Subject::ALL
            .iter()
            .map(|subject| {
                (
                    *subject,
                    metrics::subject_performance(&record.accuracies, &record.attempts, *subject),
                )
            })
            .collect())
    }

    pub async fn progress(&self, user_id: &str) -> Result<ProgressReport, QuizError> {
        let record = self.load_locked(user_id).await?;
        let thresholds = &self.config.thresholds;

        let subjects = Subject::ALL
            .iter()
            .map(|subject| {
                let per_difficulty =
                    metrics::subject_performance(&record.accuracies, &record.attempts, *subject)
                        .into_iter()
                        .map(|(difficulty, perf)| {
                            let mastered = perf.accuracy >= thresholds.mastery
                                && perf.attempts >= thresholds.minimum_attempts;
                            (
                                difficulty,
                                SkillProgress {
                                    accuracy: perf.accuracy,
                                    attempts: perf.attempts,
                                    mastered,
                                },
                            )
                        })
                        .collect();
                (*subject, per_difficulty)
            })
            .collect();

        Ok(ProgressReport {
            subjects,
            total_attempts: metrics::total_attempts(&record.attempts),
            average_accuracy: metrics::average_accuracy(&record.accuracies),
        })
    }

    /// Read path for callers that do not already hold the user's lock.
    async fn load_locked(&self, user_id: &str) -> Result<UserRecord, QuizError> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;
        self.load(user_id).await
    }

    async fn load(&self, user_id: &str) -> Result<UserRecord, QuizError> {
        let (rows, cols, actions) = self.config.table_shape();
        let record = self
            .store
            .get(user_id, rows, cols, actions)
            .await
            .inspect_err(|err| {
                tracing::warn!(user_id, error = %err, "failed to load quiz record")
            })?;

        if !record.q_table.has_shape((rows, cols, actions)) {
            return Err(QuizError::CorruptRecord(format!(
                "q-table shape {:?} does not match {:?}",
                record.q_table.shape(),
                (rows, cols, actions)
            )));
        }
        Ok(record)
    }

    fn user_lock(&self, user_id: &str) -> Arc<AsyncMutex<()>> {
        let mut locks = self.user_locks.lock();
        if locks.len() > LOCK_PRUNE_THRESHOLD {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        Arc::clone(
            locks
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(AsyncMutex::new(()))),
        )
    }
}
