//! HTTP-boundary error type. Every variant maps to a status code and a JSON
//! `{ "error": ... }` body; upstream detail stays in the logs.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::time::Duration;
use thiserror::Error;

use crate::contact::validation::FieldViolation;
use crate::contact::ContactError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error("validation_failed")]
    Validation(Vec<FieldViolation>),

    #[error("rate_limited")]
    RateLimited { retry_after: Duration },

    #[error("captcha_failed")]
    CaptchaFailed,

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl From<ContactError> for AppError {
    fn from(error: ContactError) -> Self {
        match error {
            ContactError::RateLimited { retry_after } => AppError::RateLimited { retry_after },
            ContactError::Invalid(violations) => AppError::Validation(violations),
            ContactError::CaptchaFailed => AppError::CaptchaFailed,
            ContactError::CaptchaUnavailable(e) => {
                tracing::error!("CAPTCHA verification unavailable: {}", e);
                AppError::Unavailable("captcha_unavailable".to_string())
            }
            ContactError::Upstream(e) => {
                tracing::error!("Contact submission upstream failure: {}", e);
                AppError::Upstream("submission_failed".to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, Json(serde_json::json!({ "error": msg }))).into_response(),
            AppError::Validation(fields) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({ "error": "validation_failed", "fields": fields })),
            )
                .into_response(),
            AppError::RateLimited { retry_after } => {
                let secs = retry_after.as_secs().max(1);
                (
                    StatusCode::TOO_MANY_REQUESTS,
                    [(header::RETRY_AFTER, secs.to_string())],
                    Json(serde_json::json!({ "error": "rate_limited", "retry_after": secs })),
                )
                    .into_response()
            }
            AppError::CaptchaFailed => (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "captcha_failed" })),
            )
                .into_response(),
            AppError::Unavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, Json(serde_json::json!({ "error": msg }))).into_response()
            }
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, Json(serde_json::json!({ "error": msg }))).into_response(),
            AppError::Template(e) => {
                tracing::error!("Template rendering failed: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(serde_json::json!({ "error": "internal_error" })),
                )
                    .into_response()
            }
        }
    }
}
