use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::quiz::QuizError;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
}

#[derive(Debug, Clone)]
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
    is_operational: bool,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.into(),
            is_operational: false,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    fn operational(
        status: StatusCode,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            code: code.into(),
            message: message.into(),
            is_operational: true,
        }
    }
}

impl From<QuizError> for AppError {
    fn from(err: QuizError) -> Self {
        match err {
            QuizError::MissingPriorQuestion { .. } => Self::operational(
                StatusCode::BAD_REQUEST,
                "MISSING_PRIOR_QUESTION",
                "No previous question found for this user",
            ),
            QuizError::InvalidDomainValue { .. } => Self::operational(
                StatusCode::BAD_REQUEST,
                "INVALID_DOMAIN_VALUE",
                err.to_string(),
            ),
            QuizError::StoreUnavailable(ref inner) => {
                tracing::error!(error = %inner, "record store unavailable");
                Self {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    code: "STORE_UNAVAILABLE".to_string(),
                    message: err.to_string(),
                    is_operational: false,
                }
            }
            QuizError::CorruptRecord(ref detail) => {
                tracing::error!(detail = %detail, "corrupt quiz record");
                Self::internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.is_operational {
            self.message
        } else {
            "Internal server error".to_string()
        };

        let body = ErrorResponse {
            success: false,
            error: message,
            code: self.code,
        };

        (self.status, Json(body)).into_response()
    }
}

pub fn json_error(
    status: StatusCode,
    code: impl Into<String>,
    message: impl Into<String>,
) -> AppError {
    AppError {
        status,
        code: code.into(),
        message: message.into(),
        is_operational: true,
    }
}
