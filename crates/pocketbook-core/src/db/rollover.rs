//! Month-end rollover markers

use rusqlite::{params, OptionalExtension, TransactionBehavior};

use super::transactions::insert_transaction_on;
use super::Database;
use crate::error::Result;
use crate::models::{NewTransaction, Transaction};

impl Database {
    /// Whether the rollover already fired for a user and `YYYY-MM` month
    pub fn has_rolled_over(&self, user_id: &str, month: &str) -> Result<bool> {
        let conn = self.conn()?;
        let found: Option<i64> = conn
            .query_row(
                "SELECT 1 FROM rollover_markers WHERE user_id = ? AND month = ?",
                params![user_id, month],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Insert the month-end savings transaction together with its marker.
    ///
    /// Returns `None` without writing anything when the marker already exists.
    pub fn record_rollover(
        &self,
        user_id: &str,
        month: &str,
        tx: &NewTransaction,
    ) -> Result<Option<Transaction>> {
        let mut conn = self.conn()?;
        let db_tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let claimed = db_tx.execute(
            "INSERT OR IGNORE INTO rollover_markers (user_id, month) VALUES (?, ?)",
            params![user_id, month],
        )?;
        if claimed == 0 {
            return Ok(None);
        }

        let inserted = insert_transaction_on(&db_tx, user_id, tx)?;
        db_tx.execute(
            "UPDATE rollover_markers SET transaction_id = ? WHERE user_id = ? AND month = ?",
            params![inserted.id, user_id, month],
        )?;

        db_tx.commit()?;
        Ok(Some(inserted))
    }

    /// Delete a user's rollover markers (account deletion only)
    pub fn delete_user_rollover_markers(&self, user_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM rollover_markers WHERE user_id = ?",
            params![user_id],
        )?;
        Ok(deleted)
    }
}
