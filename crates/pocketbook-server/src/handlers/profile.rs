//! Profile picture handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    Json,
};
use serde::Serialize;

use crate::{AppError, AppState, MAX_UPLOAD_SIZE};
use pocketbook_core::storage::profile_picture_path;
use pocketbook_core::PROFILE_BUCKET;

#[derive(Debug, Serialize)]
pub struct ProfilePictureResponse {
    /// Public, cache-busted URL of the picture
    pub url: String,
}

/// GET /api/users/:user_id/profile-picture - Public URL of the stored picture
pub async fn get_profile_picture(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfilePictureResponse>, AppError> {
    let key = profile_picture_path(&user_id);

    if !state.store.exists(PROFILE_BUCKET, &key)? {
        return Err(AppError::not_found("Profile picture not found"));
    }

    Ok(Json(ProfilePictureResponse {
        url: state.store.public_url(PROFILE_BUCKET, &key, state.clock.now()),
    }))
}

/// PUT /api/users/:user_id/profile-picture - Upload or replace the picture
pub async fn upload_profile_picture(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    request: Request,
) -> Result<Json<ProfilePictureResponse>, AppError> {
    let bytes = axum::body::to_bytes(request.into_body(), MAX_UPLOAD_SIZE)
        .await
        .map_err(|_| AppError::bad_request("Invalid request body or file too large (max 5MB)"))?;

    if bytes.is_empty() {
        return Err(AppError::bad_request("No image data provided"));
    }

    let key = profile_picture_path(&user_id);
    state.store.put(PROFILE_BUCKET, &key, &bytes)?;

    Ok(Json(ProfilePictureResponse {
        url: state.store.public_url(PROFILE_BUCKET, &key, state.clock.now()),
    }))
}
