use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::cv::CvError;
use crate::db::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Cv(#[from] CvError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl AppError {
    /// Status, code, message and optional details for the JSON error body.
    fn parts(&self) -> (StatusCode, &'static str, String, Option<Value>) {
        match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone(), None),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                msg.clone(),
                None,
            ),
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "PERSISTENCE_FAILURE",
                    "A database error occurred".to_string(),
                    None,
                )
            }
            AppError::Cv(e) => cv_parts(e),
        }
    }
}

fn cv_parts(error: &CvError) -> (StatusCode, &'static str, String, Option<Value>) {
    let code = error.code();
    match error {
        CvError::NoJsonFound { raw } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            code,
            error.to_string(),
            Some(json!({ "raw": raw })),
        ),
        CvError::MalformedJson { detail, payload } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            code,
            error.to_string(),
            Some(json!({ "detail": detail, "payload": payload })),
        ),
        CvError::UnexpectedShape(_) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            code,
            error.to_string(),
            None,
        ),
        CvError::CvNotFound(_) => (StatusCode::NOT_FOUND, code, error.to_string(), None),
        CvError::CompletionFailed(msg) => {
            tracing::error!("Completion failed: {msg}");
            (StatusCode::BAD_GATEWAY, code, error.to_string(), None)
        }
        CvError::TemplateUnavailable(msg) => {
            tracing::error!("Prompt template unavailable: {msg}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                code,
                "The CV prompt template is unavailable".to_string(),
                None,
            )
        }
        CvError::PersistenceFailure(e) => {
            tracing::error!("Persistence failure: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                code,
                "A database error occurred".to_string(),
                None,
            )
        }
        CvError::RenderFailure(e) => {
            tracing::error!("Render failure: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                code,
                "The CV could not be rendered".to_string(),
                None,
            )
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = self.parts();

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}
