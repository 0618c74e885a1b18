//! Account deletion
//!
//! Removes everything a user owns, in order: profile picture, transactions,
//! goals, loans, rollover markers and finally the identity record. Steps are
//! not wrapped in one transaction; a failure part-way leaves the earlier
//! steps applied.

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::db::Database;
use crate::error::Error;
use crate::identity::IdentityProvider;
use crate::storage::{profile_picture_path, ObjectStore, PROFILE_BUCKET};

/// What was removed for the user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub profile_picture_removed: bool,
    pub transactions: usize,
    pub goals: usize,
    pub loans: usize,
}

#[derive(Error, Debug)]
pub enum DeletionError {
    /// The identity provider refused to delete the account
    #[error("{0}")]
    Identity(String),

    #[error(transparent)]
    Other(#[from] Error),
}

pub fn delete_user_data(
    db: &Database,
    identity: &dyn IdentityProvider,
    store: &dyn ObjectStore,
    user_id: &str,
) -> std::result::Result<DeletionReport, DeletionError> {
    let mut report = DeletionReport::default();

    // A missing or unremovable picture does not block the deletion
    match store.remove(PROFILE_BUCKET, &profile_picture_path(user_id)) {
        Ok(removed) => report.profile_picture_removed = removed,
        Err(e) => warn!(user_id, error = %e, "Failed to remove profile picture"),
    }

    report.transactions = db.delete_user_transactions(user_id)?;
    report.goals = db.delete_user_goals(user_id)?;
    report.loans = db.delete_user_loans(user_id)?;
    db.delete_user_rollover_markers(user_id)?;

    identity
        .delete_user(user_id)
        .map_err(|e| DeletionError::Identity(e.to_string()))?;

    info!(
        user_id,
        transactions = report.transactions,
        goals = report.goals,
        loans = report.loans,
        "User and all data deleted"
    );
    Ok(report)
}
