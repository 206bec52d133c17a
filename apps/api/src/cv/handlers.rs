//! Axum route handlers for the CV API.

use axum::{
    extract::{Path, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::cv::{CvError, GeneratedCv};
use crate::errors::AppError;
use crate::models::cv::CvRecord;
use crate::state::AppState;

/// Carries the id of the record behind a returned PDF.
pub const CV_ID_HEADER: HeaderName = HeaderName::from_static("x-cv-id");

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCvRequest {
    pub profile_id: Uuid,
    pub job_description: String,
}

#[derive(Debug, Clone, Copy)]
enum Disposition {
    Inline,
    Attachment,
}

fn pdf_response(generated: GeneratedCv, disposition: Disposition) -> Response {
    let kind = match disposition {
        Disposition::Inline => "inline",
        Disposition::Attachment => "attachment",
    };
    let id = generated.record.id;
    (
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("{kind}; filename=\"cv-{id}.pdf\""),
            ),
            (CV_ID_HEADER, id.to_string()),
        ],
        generated.pdf,
    )
        .into_response()
}

/// POST /api/v1/cvs/generate
///
/// Runs the full pipeline for one profile and job description and returns the PDF.
pub async fn handle_generate_cv(
    State(state): State<AppState>,
    Json(request): Json<GenerateCvRequest>,
) -> Result<Response, AppError> {
    if request.job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "jobDescription cannot be empty".to_string(),
        ));
    }

    let profile = state
        .profiles
        .get_profile(request.profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", request.profile_id)))?;

    let generated = state
        .pipeline
        .generate(&profile, &request.job_description)
        .await?;
    Ok(pdf_response(generated, Disposition::Attachment))
}

/// GET /api/v1/cvs
pub async fn handle_list_cvs(
    State(state): State<AppState>,
) -> Result<Json<Vec<CvRecord>>, AppError> {
    Ok(Json(state.cvs.list_cvs().await?))
}

/// GET /api/v1/cvs/profile/:profile_id
pub async fn handle_list_profile_cvs(
    State(state): State<AppState>,
    Path(profile_id): Path<Uuid>,
) -> Result<Json<Vec<CvRecord>>, AppError> {
    Ok(Json(state.cvs.list_cvs_for_profile(profile_id).await?))
}

/// GET /api/v1/cvs/:id
pub async fn handle_get_cv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CvRecord>, AppError> {
    let record = state.cvs.get_cv(id).await?.ok_or(CvError::CvNotFound(id))?;
    Ok(Json(record))
}

/// PATCH /api/v1/cvs/:id/cv-data
///
/// The body is taken as raw text and goes through the normalizer and validator,
/// so both a hand-edited document and a pasted model reply are accepted.
pub async fn handle_update_cv_data(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    body: String,
) -> Result<Json<CvRecord>, AppError> {
    Ok(Json(state.pipeline.update_document(id, &body).await?))
}

/// GET /api/v1/cvs/:id/regenerate
pub async fn handle_regenerate_cv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let generated = state.pipeline.render_record(id).await?;
    Ok(pdf_response(generated, Disposition::Inline))
}

/// GET /api/v1/cvs/:id/download
pub async fn handle_download_cv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let generated = state.pipeline.render_record(id).await?;
    Ok(pdf_response(generated, Disposition::Attachment))
}

/// DELETE /api/v1/cvs/:id
pub async fn handle_delete_cv(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.cvs.delete_cv(id).await? {
        tracing::info!("Deleted CV {id}");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CvError::CvNotFound(id).into())
    }
}
