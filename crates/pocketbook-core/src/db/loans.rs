//! Loan operations
//!
//! A loan event and its mirrored income transaction are written inside one
//! SQL transaction: either both land or neither does.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use tracing::info;

use super::transactions::insert_transaction_on;
use super::{datetime_column, decimal_column, format_datetime, parsed_column, Database};
use crate::error::{Error, Result, ValidationError};
use crate::models::{
    Loan, LoanAction, LoanEvent, LoanEventRecord, LoanTarget, NewLoanEvent, NewTransaction,
    TransactionType, LOAN_CATEGORY, MAX_AMOUNT,
};

fn row_to_loan(row: &rusqlite::Row<'_>) -> rusqlite::Result<Loan> {
    Ok(Loan {
        id: row.get(0)?,
        user_id: row.get(1)?,
        name: row.get(2)?,
        total_amount: decimal_column(row, 3)?,
        remaining_amount: decimal_column(row, 4)?,
        events: Vec::new(),
    })
}

fn row_to_event(row: &rusqlite::Row<'_>) -> rusqlite::Result<(i64, LoanEvent)> {
    Ok((
        row.get(0)?,
        LoanEvent {
            seq: row.get(1)?,
            action: parsed_column(row, 2)?,
            amount: decimal_column(row, 3)?,
            note: row.get(4)?,
            date: datetime_column(row, 5)?,
        },
    ))
}

fn load_events_for_loan(conn: &Connection, loan_id: i64) -> Result<Vec<LoanEvent>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT loan_id, seq, action, amount, note, occurred_at
        FROM loan_events
        WHERE loan_id = ?
        ORDER BY seq
        "#,
    )?;
    let events = stmt
        .query_map(params![loan_id], row_to_event)?
        .map(|r| r.map(|(_, event)| event))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(events)
}

fn get_loan_on(conn: &Connection, user_id: &str, loan_id: i64) -> Result<Option<Loan>> {
    let loan = conn
        .query_row(
            "SELECT id, user_id, name, total_amount, remaining_amount FROM loans WHERE id = ? AND user_id = ?",
            params![loan_id, user_id],
            row_to_loan,
        )
        .optional()?;

    match loan {
        Some(mut loan) => {
            loan.events = load_events_for_loan(conn, loan.id)?;
            Ok(Some(loan))
        }
        None => Ok(None),
    }
}

/// Apply one event to the loan row, returning (loan_id, counterparty name)
fn apply_to_loan_row(
    conn: &Connection,
    user_id: &str,
    target: &LoanTarget,
    event: &NewLoanEvent,
) -> Result<(i64, String)> {
    match target {
        LoanTarget::New { name } => {
            if event.action != LoanAction::Take {
                return Err(Error::InvalidData(
                    "A new loan can only start with a take event".to_string(),
                ));
            }

            let existing: Option<i64> = conn
                .query_row(
                    "SELECT id FROM loans WHERE user_id = ? AND name = ?",
                    params![user_id, name],
                    |row| row.get(0),
                )
                .optional()?;
            if existing.is_some() {
                return Err(ValidationError::DuplicateCounterparty(name.clone()).into());
            }

            let amount = event.amount.to_string();
            conn.execute(
                "INSERT INTO loans (user_id, name, total_amount, remaining_amount) VALUES (?, ?, ?, ?)",
                params![user_id, name, amount, amount],
            )?;
            Ok((conn.last_insert_rowid(), name.clone()))
        }
        LoanTarget::Existing { loan_id } => {
            let (name, remaining): (String, Decimal) = conn
                .query_row(
                    "SELECT name, remaining_amount FROM loans WHERE id = ? AND user_id = ?",
                    params![loan_id, user_id],
                    |row| Ok((row.get(0)?, decimal_column(row, 1)?)),
                )
                .optional()?
                .ok_or(ValidationError::LoanNotFound)?;

            match event.action {
                LoanAction::Take => {
                    let remaining = remaining
                        .checked_add(event.amount)
                        .ok_or(ValidationError::AmountTooLarge(MAX_AMOUNT))?;
                    // total follows the post-increase outstanding amount
                    conn.execute(
                        "UPDATE loans SET total_amount = ?, remaining_amount = ? WHERE id = ?",
                        params![remaining.to_string(), remaining.to_string(), loan_id],
                    )?;
                }
                LoanAction::Clear => {
                    if event.amount > remaining {
                        return Err(ValidationError::ClearExceedsRemaining {
                            requested: event.amount,
                            remaining,
                        }
                        .into());
                    }
                    let remaining = remaining
                        .checked_sub(event.amount)
                        .ok_or(ValidationError::AmountTooLarge(MAX_AMOUNT))?;
                    conn.execute(
                        "UPDATE loans SET remaining_amount = ? WHERE id = ?",
                        params![remaining.to_string(), loan_id],
                    )?;
                }
            }
            Ok((*loan_id, name))
        }
    }
}

impl Database {
    /// Record a take/clear event and its mirrored income transaction atomically
    ///
    /// The clear limit is checked against the stored remaining amount inside
    /// the write, so a stale caller snapshot cannot drive a loan negative.
    pub fn record_loan_event(
        &self,
        user_id: &str,
        target: &LoanTarget,
        event: &NewLoanEvent,
    ) -> Result<LoanEventRecord> {
        let mut conn = self.conn()?;
        // Dropped without commit on any early return, which rolls back
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let (loan_id, name) = apply_to_loan_row(&tx, user_id, target, event)?;

        let seq: i64 = tx.query_row(
            "SELECT COALESCE(MAX(seq) + 1, 0) FROM loan_events WHERE loan_id = ?",
            params![loan_id],
            |row| row.get(0),
        )?;
        tx.execute(
            r#"
            INSERT INTO loan_events (loan_id, seq, action, amount, note, occurred_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            params![
                loan_id,
                seq,
                event.action.as_str(),
                event.amount.to_string(),
                event.note,
                format_datetime(&event.date),
            ],
        )?;

        let mirror = insert_transaction_on(
            &tx,
            user_id,
            &NewTransaction::new(
                TransactionType::Income,
                event.action.mirror_amount(event.amount),
                event.action.mirror_description(&name),
                LOAN_CATEGORY,
                event.date,
            ),
        )?;

        let loan = get_loan_on(&tx, user_id, loan_id)?
            .ok_or_else(|| Error::NotFound(format!("Loan {} after write", loan_id)))?;

        let record = LoanEventRecord { loan, mirror };
        tx.commit()?;

        info!(
            loan_id = record.loan.id,
            action = %event.action,
            amount = %event.amount,
            remaining = %record.loan.remaining_amount,
            "Loan event recorded"
        );
        Ok(record)
    }

    /// List all loans for a user with their histories, oldest loan first
    pub fn list_loans(&self, user_id: &str) -> Result<Vec<Loan>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, user_id, name, total_amount, remaining_amount FROM loans WHERE user_id = ? ORDER BY id",
        )?;
        let mut loans = stmt
            .query_map(params![user_id], row_to_loan)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT e.loan_id, e.seq, e.action, e.amount, e.note, e.occurred_at
            FROM loan_events e
            JOIN loans l ON l.id = e.loan_id
            WHERE l.user_id = ?
            ORDER BY e.loan_id, e.seq
            "#,
        )?;
        let mut events: HashMap<i64, Vec<LoanEvent>> = HashMap::new();
        for row in stmt.query_map(params![user_id], row_to_event)? {
            let (loan_id, event) = row?;
            events.entry(loan_id).or_default().push(event);
        }

        for loan in &mut loans {
            loan.events = events.remove(&loan.id).unwrap_or_default();
        }

        Ok(loans)
    }

    /// Delete every loan (and its history) of a user (account deletion only)
    pub fn delete_user_loans(&self, user_id: &str) -> Result<usize> {
        let mut conn = self.conn()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        tx.execute(
            "DELETE FROM loan_events WHERE loan_id IN (SELECT id FROM loans WHERE user_id = ?)",
            params![user_id],
        )?;
        let deleted = tx.execute("DELETE FROM loans WHERE user_id = ?", params![user_id])?;

        tx.commit()?;
        Ok(deleted)
    }
}
