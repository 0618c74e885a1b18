//! End-of-month rollover
//!
//! On the last calendar day of a month a positive daily balance is moved
//! into an automatic savings transaction. The write is keyed by
//! `(user_id, YYYY-MM)` so it happens at most once per user per month, no
//! matter how often the job runs.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::ledger::Ledger;
use crate::models::{NewTransaction, Transaction};
use crate::period::{is_last_day_of_month, month_key, Period};

/// What a rollover run did for one user
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RolloverOutcome {
    Rolled { transaction: Transaction },
    NotMonthEnd,
    NoPositiveBalance,
    AlreadyRolledOver,
}

impl RolloverOutcome {
    pub fn is_rolled(&self) -> bool {
        matches!(self, Self::Rolled { .. })
    }
}

pub struct RolloverJob {
    clock: Arc<dyn Clock>,
}

impl Default for RolloverJob {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl RolloverJob {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Evaluate the rule for the ledger's user
    pub fn run(&self, ledger: &Ledger<'_>) -> Result<RolloverOutcome> {
        let now = self.clock.now();
        let today = self.clock.today();

        if !is_last_day_of_month(today) {
            return Ok(RolloverOutcome::NotMonthEnd);
        }

        let month = month_key(today);
        if ledger.db().has_rolled_over(ledger.user_id(), &month)? {
            debug!(user_id = %ledger.user_id(), %month, "Rollover already done");
            return Ok(RolloverOutcome::AlreadyRolledOver);
        }

        let balance = ledger.stats(&Period::daily(today))?.balance;
        if balance <= rust_decimal::Decimal::ZERO {
            return Ok(RolloverOutcome::NoPositiveBalance);
        }

        let tx = NewTransaction::end_of_month(balance, now);
        match ledger.db().record_rollover(ledger.user_id(), &month, &tx)? {
            Some(transaction) => {
                info!(
                    user_id = %ledger.user_id(),
                    %month,
                    savings = %transaction.savings,
                    "End of month savings recorded"
                );
                Ok(RolloverOutcome::Rolled { transaction })
            }
            // Another run claimed the month between the check and the write
            None => Ok(RolloverOutcome::AlreadyRolledOver),
        }
    }
}
