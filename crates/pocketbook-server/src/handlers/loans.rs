//! Loan handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{AppError, AppState};
use pocketbook_core::models::Loan;
use pocketbook_core::Ledger;

/// GET /api/users/:user_id/loans - All loans with their event history
pub async fn list_loans(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Loan>>, AppError> {
    let loans = Ledger::for_user(&state.db, user_id).loans()?;
    Ok(Json(loans))
}

/// GET /api/users/:user_id/loans/active - Loans with an outstanding balance
pub async fn list_active_loans(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Loan>>, AppError> {
    let loans = Ledger::for_user(&state.db, user_id).active_loans()?;
    Ok(Json(loans))
}
