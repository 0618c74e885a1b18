//! Local identity records

use rusqlite::{params, OptionalExtension};

use super::{datetime_column, Database};
use crate::error::{Error, Result};
use crate::models::User;

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        email: row.get(1)?,
        name: row.get(2)?,
        created_at: datetime_column(row, 3)?,
    })
}

impl Database {
    /// Insert a user with an already-hashed password
    pub fn insert_user(&self, id: &str, email: &str, name: &str, password_hash: &str) -> Result<User> {
        let conn = self.conn()?;

        let taken: Option<String> = conn
            .query_row(
                "SELECT id FROM users WHERE email = ?",
                params![email],
                |row| row.get(0),
            )
            .optional()?;
        if taken.is_some() {
            return Err(Error::Identity(format!("User already registered: {}", email)));
        }

        conn.execute(
            "INSERT INTO users (id, email, name, password_hash) VALUES (?, ?, ?, ?)",
            params![id, email, name, password_hash],
        )?;
        drop(conn);

        self.get_user(id)?
            .ok_or_else(|| Error::NotFound(format!("User {} after insert", id)))
    }

    pub fn get_user(&self, id: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, email, name, created_at FROM users WHERE id = ?",
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// Look up a user and their password hash by email (case-insensitive)
    pub fn find_user_credentials(&self, email: &str) -> Result<Option<(User, String)>> {
        let conn = self.conn()?;
        let found = conn
            .query_row(
                "SELECT id, email, name, created_at, password_hash FROM users WHERE email = ?",
                params![email.trim()],
                |row| Ok((row_to_user(row)?, row.get::<_, String>(4)?)),
            )
            .optional()?;
        Ok(found)
    }

    pub fn get_password_hash(&self, id: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let hash = conn
            .query_row(
                "SELECT password_hash FROM users WHERE id = ?",
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(hash)
    }

    /// Update any of email, name and password hash
    pub fn update_user(
        &self,
        id: &str,
        email: Option<&str>,
        name: Option<&str>,
        password_hash: Option<&str>,
    ) -> Result<User> {
        let conn = self.conn()?;
        let updated = conn.execute(
            r#"
            UPDATE users SET
                email = COALESCE(?, email),
                name = COALESCE(?, name),
                password_hash = COALESCE(?, password_hash)
            WHERE id = ?
            "#,
            params![email, name, password_hash, id],
        )?;
        drop(conn);

        if updated == 0 {
            return Err(Error::NotFound(format!("User {}", id)));
        }

        self.get_user(id)?
            .ok_or_else(|| Error::NotFound(format!("User {}", id)))
    }

    /// Delete the identity record, returning whether it existed
    pub fn delete_user(&self, id: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM users WHERE id = ?", params![id])?;
        Ok(deleted > 0)
    }

    /// Every user id with an identity record or ledger rows
    pub fn list_ledger_user_ids(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id FROM users
            UNION
            SELECT DISTINCT user_id FROM transactions
            ORDER BY 1
            "#,
        )?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(ids)
    }
}
