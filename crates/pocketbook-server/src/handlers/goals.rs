//! Goal handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AppError, AppState};
use pocketbook_core::goals::{default_target, parse_target};
use pocketbook_core::models::{Goal, GoalType, NewGoal};
use pocketbook_core::{GoalView, Ledger};

/// Query parameters for listing goals
#[derive(Debug, Deserialize)]
pub struct GoalQuery {
    /// Only goals of this type created in the selected month/year
    #[serde(rename = "type")]
    pub kind: Option<GoalType>,
    /// `YYYY-MM` for monthly, `YYYY` for yearly; defaults to today
    pub date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GoalListResponse {
    pub goals: Vec<GoalView>,
    pub completed: usize,
}

/// GET /api/users/:user_id/goals - Goals with live progress
pub async fn list_goals(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<GoalQuery>,
) -> Result<Json<GoalListResponse>, AppError> {
    let ledger = Ledger::for_user(&state.db, user_id);

    let goals = match query.kind {
        Some(kind) => {
            let selected = match query.date.as_deref() {
                Some(selector) => parse_target(kind, selector)
                    .map_err(|e| AppError::bad_request(&e.to_string()))?,
                None => state.clock.today(),
            };
            ledger.goal_views(kind, selected)?
        }
        None => {
            let transactions = ledger.transactions()?;
            ledger
                .goals()?
                .into_iter()
                .map(|g| GoalView::new(g, &transactions))
                .collect()
        }
    };

    let completed = goals.iter().filter(|v| v.goal.is_reached).count();
    Ok(Json(GoalListResponse { goals, completed }))
}

/// Request body for creating a goal
#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    #[serde(rename = "type")]
    pub kind: GoalType,
    pub amount: Decimal,
    #[serde(default)]
    pub description: String,
    /// `YYYY-MM` for monthly, `YYYY` for yearly
    pub target: Option<String>,
    pub priority: Option<i64>,
}

/// POST /api/users/:user_id/goals - Create a goal
pub async fn create_goal(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(req): Json<CreateGoalRequest>,
) -> Result<Json<Goal>, AppError> {
    let now = state.clock.now();

    let target_date = match req.target.as_deref() {
        Some(selector) => parse_target(req.kind, selector)
            .map_err(|e| AppError::bad_request(&e.to_string()))?,
        None => default_target(req.kind, now.date_naive()),
    };

    let new_goal = NewGoal {
        kind: req.kind,
        amount: req.amount,
        description: req.description.trim().to_string(),
        target_date,
        priority: req.priority.unwrap_or(1),
    };

    let goal = Ledger::for_user(&state.db, user_id).add_goal(&new_goal, now)?;
    Ok(Json(goal))
}

/// POST /api/users/:user_id/goals/:id/toggle - Flip pending/completed
pub async fn toggle_goal(
    State(state): State<Arc<AppState>>,
    Path((user_id, id)): Path<(String, i64)>,
) -> Result<Json<Goal>, AppError> {
    let goal = Ledger::for_user(&state.db, user_id).toggle_goal(id)?;
    Ok(Json(goal))
}
