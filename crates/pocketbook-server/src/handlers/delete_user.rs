//! Privileged account deletion endpoint
//!
//! Response bodies are fixed strings the web client matches on.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::error;

use crate::AppState;
use pocketbook_core::{delete_user_data, DeletionError};

#[derive(Debug, Deserialize)]
struct DeleteUserRequest {
    #[serde(default)]
    user_id: Option<String>,
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Fallback for any method other than POST on /api/delete-user
pub async fn method_not_allowed() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response()
}

/// POST /api/delete-user - Remove a user's picture, ledger rows and identity
///
/// Steps are not rolled back if a later one fails.
pub async fn delete_user(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let user_id = serde_json::from_slice::<DeleteUserRequest>(&body)
        .ok()
        .and_then(|req| req.user_id)
        .filter(|id| !id.trim().is_empty());

    let Some(user_id) = user_id else {
        return error_response(StatusCode::BAD_REQUEST, "Missing user_id");
    };

    match delete_user_data(
        &state.db,
        state.identity.as_ref(),
        state.store.as_ref(),
        &user_id,
    ) {
        Ok(_) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "User and all data deleted successfully"
            })),
        )
            .into_response(),
        Err(DeletionError::Identity(message)) => {
            error!(user_id = %user_id, error = %message, "Identity deletion failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, &message)
        }
        Err(DeletionError::Other(e)) => {
            error!(user_id = %user_id, error = %e, "Unexpected error deleting user");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong")
        }
    }
}
