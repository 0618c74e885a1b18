//! Savings goal operations

use rusqlite::{params, OptionalExtension};

use super::{date_column, datetime_column, decimal_column, format_datetime, parsed_column, Database};
use crate::error::{Error, Result};
use crate::models::{Goal, GoalStatus, NewGoal};

const GOAL_COLUMNS: &str =
    "id, user_id, type, amount, description, target_date, priority, goal_created, status, is_reached";

fn row_to_goal(row: &rusqlite::Row<'_>) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        kind: parsed_column(row, 2)?,
        amount: decimal_column(row, 3)?,
        description: row.get(4)?,
        target_date: date_column(row, 5)?,
        priority: row.get(6)?,
        goal_created: datetime_column(row, 7)?,
        status: parsed_column(row, 8)?,
        is_reached: row.get(9)?,
    })
}

impl Database {
    /// Insert a goal; new goals always start pending
    pub fn insert_goal(
        &self,
        user_id: &str,
        goal: &NewGoal,
        created: chrono::DateTime<chrono::Utc>,
    ) -> Result<Goal> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO goals (user_id, type, amount, description, target_date, priority, goal_created, status, is_reached)
            VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', 0)
            "#,
            params![
                user_id,
                goal.kind.as_str(),
                goal.amount.to_string(),
                goal.description,
                goal.target_date.format("%Y-%m-%d").to_string(),
                goal.priority,
                format_datetime(&created),
            ],
        )?;

        let id = conn.last_insert_rowid();
        drop(conn);
        self.get_goal(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Goal {} after insert", id)))
    }

    pub fn get_goal(&self, user_id: &str, id: i64) -> Result<Option<Goal>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM goals WHERE id = ? AND user_id = ?", GOAL_COLUMNS);
        let goal = conn
            .query_row(&sql, params![id, user_id], row_to_goal)
            .optional()?;
        Ok(goal)
    }

    /// List all goals of a user by ascending priority
    pub fn list_goals(&self, user_id: &str) -> Result<Vec<Goal>> {
        let conn = self.conn()?;
        let sql = format!(
            "SELECT {} FROM goals WHERE user_id = ? ORDER BY priority ASC, id ASC",
            GOAL_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let goals = stmt
            .query_map(params![user_id], row_to_goal)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(goals)
    }

    /// Set a goal's status, keeping `is_reached` in step with it
    pub fn set_goal_status(&self, user_id: &str, id: i64, status: GoalStatus) -> Result<Goal> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE goals SET status = ?, is_reached = ? WHERE id = ? AND user_id = ?",
            params![status.as_str(), status == GoalStatus::Completed, id, user_id],
        )?;
        drop(conn);

        if updated == 0 {
            return Err(Error::NotFound(format!("Goal {}", id)));
        }

        self.get_goal(user_id, id)?
            .ok_or_else(|| Error::NotFound(format!("Goal {}", id)))
    }

    /// Delete every goal of a user (account deletion only)
    pub fn delete_user_goals(&self, user_id: &str) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM goals WHERE user_id = ?", params![user_id])?;
        Ok(deleted)
    }
}
