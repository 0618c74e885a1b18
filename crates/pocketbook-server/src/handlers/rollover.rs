//! Month-end rollover handler

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{AppError, AppState};
use pocketbook_core::{Ledger, RolloverJob, RolloverOutcome};

/// POST /api/users/:user_id/rollover - Evaluate the month-end rule now
///
/// Safe to call repeatedly; the rule fires at most once per month.
pub async fn run_rollover(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<RolloverOutcome>, AppError> {
    let ledger = Ledger::for_user(&state.db, user_id);
    let outcome = RolloverJob::new(state.clock.clone()).run(&ledger)?;
    Ok(Json(outcome))
}
