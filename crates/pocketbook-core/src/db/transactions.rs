//! Transaction operations

use rusqlite::{params, Connection, OptionalExtension};

use super::{datetime_column, decimal_column, format_datetime, parsed_column, Database};
use crate::error::{Error, Result};
use crate::models::{NewTransaction, Transaction};

const TRANSACTION_COLUMNS: &str =
    "id, user_id, type, amount, savings, description, category, date, created_at";

pub(crate) fn row_to_transaction(row: &rusqlite::Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: parsed_column(row, 2)?,
        amount: decimal_column(row, 3)?,
        savings: decimal_column(row, 4)?,
        description: row.get(5)?,
        category: row.get(6)?,
        date: datetime_column(row, 7)?,
        created_at: datetime_column(row, 8)?,
    })
}

/// Insert on an existing connection so callers can group writes in one SQL transaction
pub(crate) fn insert_transaction_on(
    conn: &Connection,
    user_id: &str,
    tx: &NewTransaction,
) -> Result<Transaction> {
    conn.execute(
        r#"
        INSERT INTO transactions (user_id, type, amount, savings, description, category, date)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
        params![
            user_id,
            tx.kind.as_str(),
            tx.amount.to_string(),
            tx.savings.to_string(),
            tx.description,
            tx.category,
            format_datetime(&tx.date),
        ],
    )?;

    let id = conn.last_insert_rowid();
    get_transaction_on(conn, user_id, id)?
        .ok_or_else(|| Error::NotFound(format!("Transaction {} after insert", id)))
}

fn get_transaction_on(conn: &Connection, user_id: &str, id: i64) -> Result<Option<Transaction>> {
    let sql = format!(
        "SELECT {} FROM transactions WHERE id = ? AND user_id = ?",
        TRANSACTION_COLUMNS
    );
    let tx = conn
        .query_row(&sql, params![id, user_id], row_to_transaction)
        .optional()?;
    Ok(tx)
}

impl Database {
    /// Insert a transaction for a user
    pub fn insert_transaction(&self, user_id: &str, tx: &NewTransaction) -> Result<Transaction> {
        let conn = self.conn()?;
        insert_transaction_on(&conn, user_id, tx)
    }

    /// List all transactions for a user, newest first (date, then creation)
    pub fn list_transactions(&self, user_id: &str) -> Result<Vec<Transaction>> {
        let conn = self.conn()?;
        let sql = format!(
            r#"
            SELECT {}
            FROM transactions
            WHERE user_id = ?
            ORDER BY date DESC, created_at DESC, id DESC
            "#,
            TRANSACTION_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;

        let transactions = stmt
            .query_map(params![user_id], row_to_transaction)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(transactions)
    }

    /// Count transactions for a user
    pub fn count_transactions(&self, user_id: &str) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM transactions WHERE user_id = ?",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Delete every transaction of a user (account deletion only)
    pub fn delete_user_transactions(&self, user_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM transactions WHERE user_id = ?", params![user_id])?;
        Ok(deleted)
    }
}
