//! Account settings handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use super::auth::identity_error;
use crate::{AppError, AppState};
use pocketbook_core::models::User;
use pocketbook_core::AccountUpdate;

/// PUT /api/users/:user_id/account - Update email, name or password
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(update): Json<AccountUpdate>,
) -> Result<Json<User>, AppError> {
    let user = state
        .identity
        .update_account(&user_id, &update)
        .map_err(identity_error)?;
    Ok(Json(user))
}
