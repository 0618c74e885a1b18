//! Sign-up and sign-in handlers

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;
use tracing::info;

use crate::{AppError, AppState};
use pocketbook_core::models::User;
use pocketbook_core::{Error as CoreError, SignUp, ValidationError};

/// Request body for sign-in
#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Map identity provider failures to client errors.
///
/// Provider messages (duplicate email, malformed address) are shown as-is.
pub(crate) fn identity_error(err: CoreError) -> AppError {
    match err {
        CoreError::Identity(msg) => AppError::bad_request(&msg),
        CoreError::Validation(ValidationError::InvalidCredentials) => {
            AppError::unauthorized(&ValidationError::InvalidCredentials.to_string())
        }
        other => other.into(),
    }
}

/// POST /api/auth/signup - Register a new account
pub async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignUp>,
) -> Result<Json<User>, AppError> {
    let user = state.identity.sign_up(&request).map_err(identity_error)?;
    info!(user_id = %user.id, "Account created via API");
    Ok(Json(user))
}

/// POST /api/auth/signin - Check credentials and return the account
pub async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SignInRequest>,
) -> Result<Json<User>, AppError> {
    let user = state
        .identity
        .sign_in(request.email.trim(), &request.password)
        .map_err(identity_error)?;
    Ok(Json(user))
}
