use thiserror::Error;
use uuid::Uuid;

use crate::db::StoreError;
use crate::render::RenderError;

/// Everything that can end a CV request. None of these are retried by the
/// pipeline; regenerating is the user's call.
#[derive(Debug, Error)]
pub enum CvError {
    #[error("prompt template unavailable: {0}")]
    TemplateUnavailable(String),

    #[error("completion failed: {0}")]
    CompletionFailed(String),

    /// Carries the raw completion so the caller can see what the model said.
    #[error("no JSON value found in completion")]
    NoJsonFound { raw: String },

    /// Carries the parser's message and the isolated payload for manual repair.
    #[error("malformed JSON: {detail}")]
    MalformedJson { detail: String, payload: String },

    #[error("unexpected document shape: {0}")]
    UnexpectedShape(String),

    #[error("CV {0} not found")]
    CvNotFound(Uuid),

    #[error("persistence failure: {0}")]
    PersistenceFailure(#[from] StoreError),

    #[error("render failure: {0}")]
    RenderFailure(#[from] RenderError),
}

impl CvError {
    /// Stable machine-readable code used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            CvError::TemplateUnavailable(_) => "TEMPLATE_UNAVAILABLE",
            CvError::CompletionFailed(_) => "COMPLETION_FAILED",
            CvError::NoJsonFound { .. } => "NO_JSON_FOUND",
            CvError::MalformedJson { .. } => "MALFORMED_JSON",
            CvError::UnexpectedShape(_) => "UNEXPECTED_SHAPE",
            CvError::CvNotFound(_) => "NOT_FOUND",
            CvError::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
            CvError::RenderFailure(_) => "RENDER_FAILURE",
        }
    }
}
