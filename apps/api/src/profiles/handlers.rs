use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::profile::{CreateProfileRequest, Profile, UpdateProfileRequest};
use crate::state::AppState;

fn check_profile_name(name: &str) -> Result<(), AppError> {
    if name.trim().is_empty() {
        return Err(AppError::Validation(
            "profileName cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn check_email(email: &str) -> Result<(), AppError> {
    match email.trim().split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(AppError::Validation(format!(
            "'{email}' is not a valid email address"
        ))),
    }
}

fn profile_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Profile {id} not found"))
}

/// GET /api/v1/profiles
pub async fn handle_list_profiles(
    State(state): State<AppState>,
) -> Result<Json<Vec<Profile>>, AppError> {
    Ok(Json(state.profiles.list_profiles().await?))
}

/// POST /api/v1/profiles
pub async fn handle_create_profile(
    State(state): State<AppState>,
    Json(request): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<Profile>), AppError> {
    check_profile_name(&request.profile_name)?;
    check_email(&request.email)?;

    let profile = state.profiles.create_profile(&request).await?;
    tracing::info!("Created profile {}", profile.id);
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /api/v1/profiles/:id
pub async fn handle_get_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Profile>, AppError> {
    state
        .profiles
        .get_profile(id)
        .await?
        .map(Json)
        .ok_or_else(|| profile_not_found(id))
}

/// PATCH /api/v1/profiles/:id
///
/// Fields present in the body overwrite, absent fields stay as they are.
pub async fn handle_update_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<UpdateProfileRequest>,
) -> Result<Json<Profile>, AppError> {
    if let Some(name) = &update.profile_name {
        check_profile_name(name)?;
    }
    if let Some(email) = &update.email {
        check_email(email)?;
    }

    state
        .profiles
        .update_profile(id, &update)
        .await?
        .map(Json)
        .ok_or_else(|| profile_not_found(id))
}

/// DELETE /api/v1/profiles/:id
pub async fn handle_delete_profile(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.profiles.delete_profile(id).await? {
        tracing::info!("Deleted profile {id}");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(profile_not_found(id))
    }
}
