//! Dashboard handler and view period parsing

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{AppError, AppState};
use pocketbook_core::{Dashboard, Ledger, Period, ViewPeriod};

/// `?period=daily|monthly|yearly&date=<selector>` query
///
/// Both parts are optional: the view defaults to monthly and the selector to
/// the server's today.
#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
    pub date: Option<String>,
}

impl PeriodQuery {
    pub(crate) fn resolve(&self, state: &AppState) -> Result<Period, AppError> {
        let view = match self.period.as_deref() {
            Some(p) => p
                .parse::<ViewPeriod>()
                .map_err(|e| AppError::bad_request(&e))?,
            None => ViewPeriod::Monthly,
        };

        match self.date.as_deref() {
            Some(selector) => Ok(Period::from_selector(view, selector)?),
            None => Ok(Period::new(view, state.clock.today())),
        }
    }
}

/// GET /api/users/:user_id/dashboard - Stats, chart and category shares for a period
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<PeriodQuery>,
) -> Result<Json<Dashboard>, AppError> {
    let period = query.resolve(&state)?;
    let dashboard = Ledger::for_user(&state.db, user_id).dashboard(period)?;
    Ok(Json(dashboard))
}
