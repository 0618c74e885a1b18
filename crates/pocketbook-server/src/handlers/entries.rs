//! Transaction listing and entry submission handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::dashboard::PeriodQuery;
use crate::{AppError, AppState};
use pocketbook_core::models::Transaction;
use pocketbook_core::{EntryForm, EntryOutcome, Ledger};

/// GET /api/users/:user_id/transactions - All transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<Transaction>>, AppError> {
    let transactions = Ledger::for_user(&state.db, user_id).transactions()?;
    Ok(Json(transactions))
}

/// POST /api/users/:user_id/entries - Submit the add-entry form
///
/// The period query names the view the form was submitted from; savings are
/// checked against that view's balance.
pub async fn submit_entry(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<PeriodQuery>,
    Json(form): Json<EntryForm>,
) -> Result<Json<EntryOutcome>, AppError> {
    let period = query.resolve(&state)?;
    let outcome = Ledger::for_user(&state.db, user_id).submit(&form, &period)?;
    Ok(Json(outcome))
}
