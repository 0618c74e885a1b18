//! Per-user ledger
//!
//! [`Ledger`] is the entry point for every engine operation. It is bound to
//! one user id when created and never touches another user's rows.
//!
//! ```ignore
//! let ledger = Ledger::for_user(&db, "user-123");
//! ledger.take_loan(LoanTarget::New { name: "Alice".into() }, dec!(500), now, "")?;
//! let stats = ledger.stats(&Period::monthly(today))?;
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::db::Database;
use crate::entry::{Entry, EntryForm, EntryOutcome};
use crate::error::{Error, Result, ValidationError};
use crate::goals::{self, GoalView};
use crate::models::{
    validate_amount, Goal, GoalType, Loan, LoanAction, LoanEventRecord, LoanTarget, NewGoal,
    NewLoanEvent, NewTransaction, Stats, Transaction, TransactionType,
};
use crate::period::Period;
use crate::stats::{self, Dashboard};

/// Full in-memory copy of a user's ledger
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub transactions: Vec<Transaction>,
    pub loans: Vec<Loan>,
}

impl Snapshot {
    pub fn stats(&self, period: &Period) -> Stats {
        stats::compute_stats(period, &self.transactions, &self.loans)
    }

    pub fn loan_balance(&self) -> Decimal {
        stats::aggregate_loan_balance(&self.loans)
    }
}

/// Engine operations scoped to one user
pub struct Ledger<'a> {
    db: &'a Database,
    user_id: String,
}

impl<'a> Ledger<'a> {
    pub fn for_user(db: &'a Database, user_id: impl Into<String>) -> Self {
        Self {
            db,
            user_id: user_id.into(),
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn db(&self) -> &Database {
        self.db
    }

    // ========== Reads ==========

    /// All transactions, newest first
    pub fn transactions(&self) -> Result<Vec<Transaction>> {
        self.db.list_transactions(&self.user_id)
    }

    pub fn loans(&self) -> Result<Vec<Loan>> {
        self.db.list_loans(&self.user_id)
    }

    /// Loans with money still owed
    pub fn active_loans(&self) -> Result<Vec<Loan>> {
        Ok(self.loans()?.into_iter().filter(Loan::is_active).collect())
    }

    pub fn loan_balance(&self) -> Result<Decimal> {
        Ok(stats::aggregate_loan_balance(&self.loans()?))
    }

    pub fn snapshot(&self) -> Result<Snapshot> {
        Ok(Snapshot {
            transactions: self.transactions()?,
            loans: self.loans()?,
        })
    }

    pub fn stats(&self, period: &Period) -> Result<Stats> {
        Ok(self.snapshot()?.stats(period))
    }

    pub fn dashboard(&self, period: Period) -> Result<Dashboard> {
        let snapshot = self.snapshot()?;
        Ok(Dashboard::build(
            period,
            &snapshot.transactions,
            &snapshot.loans,
        ))
    }

    // ========== Transactions ==========

    /// Record a plain transaction.
    ///
    /// Savings are checked against the balance of `period` and the aggregate
    /// loan balance before anything is written.
    pub fn record_transaction(&self, tx: &NewTransaction, period: &Period) -> Result<Transaction> {
        if tx.kind == TransactionType::Savings {
            validate_amount(tx.savings)?;
            let snapshot = self.snapshot()?;
            let balance = snapshot.stats(period).balance;
            stats::check_savings(tx.savings, balance, snapshot.loan_balance())?;
        } else {
            validate_amount(tx.amount)?;
        }

        let recorded = self.db.insert_transaction(&self.user_id, tx)?;
        info!(
            user_id = %self.user_id,
            id = recorded.id,
            kind = %recorded.kind,
            amount = %recorded.amount,
            "Transaction recorded"
        );
        Ok(recorded)
    }

    // ========== Loans ==========

    /// Take money from a counterparty, opening a loan or adding to one
    pub fn take_loan(
        &self,
        target: LoanTarget,
        amount: Decimal,
        date: DateTime<Utc>,
        note: &str,
    ) -> Result<LoanEventRecord> {
        let target = match target {
            LoanTarget::New { name } => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(ValidationError::MissingCounterparty.into());
                }
                LoanTarget::New {
                    name: name.to_string(),
                }
            }
            existing => existing,
        };

        self.record_loan_event(&target, LoanAction::Take, amount, date, note)
    }

    /// Repay part or all of an existing loan
    pub fn clear_loan(
        &self,
        loan_id: i64,
        amount: Decimal,
        date: DateTime<Utc>,
        note: &str,
    ) -> Result<LoanEventRecord> {
        self.record_loan_event(
            &LoanTarget::Existing { loan_id },
            LoanAction::Clear,
            amount,
            date,
            note,
        )
    }

    fn record_loan_event(
        &self,
        target: &LoanTarget,
        action: LoanAction,
        amount: Decimal,
        date: DateTime<Utc>,
        note: &str,
    ) -> Result<LoanEventRecord> {
        validate_amount(amount)?;

        self.db.record_loan_event(
            &self.user_id,
            target,
            &NewLoanEvent {
                action,
                amount,
                date,
                note: note.to_string(),
            },
        )
    }

    /// Validate and record an add-entry form.
    ///
    /// `period` is the view the form was submitted from; it supplies the
    /// balance the savings guard checks against.
    pub fn submit(&self, form: &EntryForm, period: &Period) -> Result<EntryOutcome> {
        match form.validate()? {
            Entry::Plain(tx) => Ok(EntryOutcome::Transaction(
                self.record_transaction(&tx, period)?,
            )),
            Entry::Loan { target, event } => {
                let record = match event.action {
                    LoanAction::Take => {
                        self.take_loan(target, event.amount, event.date, &event.note)?
                    }
                    LoanAction::Clear => match target {
                        LoanTarget::Existing { loan_id } => {
                            self.clear_loan(loan_id, event.amount, event.date, &event.note)?
                        }
                        LoanTarget::New { .. } => {
                            return Err(ValidationError::LoanNotFound.into())
                        }
                    },
                };
                Ok(EntryOutcome::Loan(record))
            }
        }
    }

    // ========== Goals ==========

    pub fn add_goal(&self, goal: &NewGoal, created: DateTime<Utc>) -> Result<Goal> {
        goals::validate(goal)?;
        let inserted = self.db.insert_goal(&self.user_id, goal, created)?;
        info!(user_id = %self.user_id, id = inserted.id, kind = %inserted.kind, "Goal added");
        Ok(inserted)
    }

    /// All goals by ascending priority
    pub fn goals(&self) -> Result<Vec<Goal>> {
        self.db.list_goals(&self.user_id)
    }

    /// Goals of one type shown for the selected month/year, with live progress
    pub fn goal_views(&self, kind: GoalType, selected: NaiveDate) -> Result<Vec<GoalView>> {
        let all = self.goals()?;
        let transactions = self.transactions()?;
        let views: Vec<GoalView> = goals::goals_for_view(&all, kind, selected)
            .into_iter()
            .map(|g| GoalView::new(g, &transactions))
            .collect();
        debug!(kind = %kind, %selected, count = views.len(), "Loaded goal views");
        Ok(views)
    }

    /// Flip a goal between pending and completed
    pub fn toggle_goal(&self, goal_id: i64) -> Result<Goal> {
        let goal = self
            .db
            .get_goal(&self.user_id, goal_id)?
            .ok_or_else(|| Error::NotFound(format!("Goal {}", goal_id)))?;
        self.db
            .set_goal_status(&self.user_id, goal_id, goal.status.toggled())
    }
}
