use std::collections::BTreeMap;

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use crate::quiz::engine::SkillProgress;
use crate::quiz::{Difficulty, SkillPerformance, Subject};
use crate::response::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/next", post(next_question))
        .route("/update", post(update_state))
        .route("/:user_id/stats", get(user_stats))
        .route("/:user_id/progress", get(user_progress))
}

#[derive(Debug, Deserialize)]
struct NextQuestionRequest {
    user_id: String,
    current_subject: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedbackRequest {
    user_id: String,
    correct: bool,
}

#[derive(Debug, Serialize)]
struct NextQuestionResponse {
    subject: Subject,
    difficulty: Difficulty,
    exploration: bool,
    metrics: QuestionMetrics,
}

#[derive(Debug, Serialize)]
struct QuestionMetrics {
    current_accuracy: f64,
    total_attempts: u32,
}

#[derive(Debug, Serialize)]
struct FeedbackResponse {
    reward: f64,
    new_accuracy: f64,
    total_attempts: u32,
    current_difficulty: Difficulty,
    performance_summary: PerformanceSummary,
}

#[derive(Debug, Serialize)]
struct PerformanceSummary {
    subject: Subject,
    accuracies: BTreeMap<Difficulty, f64>,
    total_attempts: u32,
}

#[derive(Debug, Serialize)]
struct StatsResponse {
    user_id: String,
    statistics: BTreeMap<Subject, BTreeMap<Difficulty, SkillPerformance>>,
}

#[derive(Debug, Serialize)]
struct ProgressResponse {
    user_id: String,
    progress_report: BTreeMap<Subject, BTreeMap<Difficulty, SkillProgress>>,
    overall_stats: OverallStats,
}

#[derive(Debug, Serialize)]
struct OverallStats {
    total_attempts: u64,
    average_accuracy: f64,
}

async fn next_question(
    State(state): State<AppState>,
    Json(payload): Json<NextQuestionRequest>,
) -> Result<Response, AppError> {
    let user_id = require_user_id(&payload.user_id)?;
    let current_subject = match payload.current_subject.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => Some(raw.parse::<Subject>()?),
        _ => None,
    };

    let next = state
        .engine()
        .next_question(user_id, current_subject)
        .await?;

    Ok(Json(NextQuestionResponse {
        subject: next.action.subject,
        difficulty: next.action.difficulty,
        exploration: next.exploration,
        metrics: QuestionMetrics {
            current_accuracy: next.current_accuracy,
            total_attempts: next.total_attempts,
        },
    })
    .into_response())
}

async fn update_state(
    State(state): State<AppState>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<Response, AppError> {
    let user_id = require_user_id(&payload.user_id)?;
    let outcome = state
        .engine()
        .submit_feedback(user_id, payload.correct)
        .await?;

    Ok(Json(FeedbackResponse {
        reward: outcome.reward.total,
        new_accuracy: outcome.new_accuracy,
        total_attempts: outcome.total_attempts,
        current_difficulty: outcome.action.difficulty,
        performance_summary: PerformanceSummary {
            subject: outcome.action.subject,
            accuracies: outcome.subject_accuracies,
            total_attempts: outcome.total_attempts,
        },
    })
    .into_response())
}

async fn user_stats(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, AppError> {
    let user_id = require_user_id(&user_id)?;
    let statistics = state.engine().stats(user_id).await?;

    Ok(Json(StatsResponse {
        user_id: user_id.to_string(),
        statistics,
    })
    .into_response())
}

async fn user_progress(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Response, AppError> {
    let user_id = require_user_id(&user_id)?;
    let report = state.engine().progress(user_id).await?;

    Ok(Json(ProgressResponse {
        user_id: user_id.to_string(),
        progress_report: report.subjects,
        overall_stats: OverallStats {
            total_attempts: report.total_attempts,
            average_accuracy: report.average_accuracy,
        },
    })
    .into_response())
}

fn require_user_id(raw: &str) -> Result<&str, AppError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("user_id is required"));
    }
    Ok(trimmed)
}
