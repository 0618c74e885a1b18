//! Identity provider
//!
//! Email/password accounts behind the [`IdentityProvider`] trait. The
//! bundled [`LocalIdentity`] keeps users in the same SQLite database as the
//! ledger and hashes passwords with Argon2id.

use argon2::{
    password_hash::{Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::db::Database;
use crate::error::{Error, Result, ValidationError};
use crate::models::User;

/// Account details sent on sign-up
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignUp {
    pub email: String,
    #[serde(default)]
    pub name: String,
    pub password: String,
    pub confirm_password: String,
}

/// Credential/profile update. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountUpdate {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub confirm_password: Option<String>,
}

pub trait IdentityProvider: Send + Sync {
    fn sign_up(&self, request: &SignUp) -> Result<User>;

    fn sign_in(&self, email: &str, password: &str) -> Result<User>;

    /// Session lookup by user id
    fn get_user(&self, user_id: &str) -> Result<Option<User>>;

    fn update_account(&self, user_id: &str, update: &AccountUpdate) -> Result<User>;

    /// Re-verify a user's password (before destructive actions)
    fn verify_password(&self, user_id: &str, password: &str) -> Result<bool>;

    fn delete_user(&self, user_id: &str) -> Result<()>;
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::encode_b64(Uuid::new_v4().as_bytes())
        .map_err(|e| Error::Identity(format!("Failed to create salt: {}", e)))?;
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| Error::Identity(format!("Failed to hash password: {}", e)))?;
    Ok(hash.to_string())
}

fn password_matches(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| Error::Identity(format!("Invalid stored password hash: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(PasswordHashError::Password) => Ok(false),
        Err(other) => Err(Error::Identity(format!(
            "Password verification failed: {}",
            other
        ))),
    }
}

/// Identity records stored next to the ledger
#[derive(Clone)]
pub struct LocalIdentity {
    db: Database,
}

impl LocalIdentity {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl IdentityProvider for LocalIdentity {
    fn sign_up(&self, request: &SignUp) -> Result<User> {
        let email = request.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(Error::Identity(format!("Invalid email address: {}", email)));
        }
        if request.password != request.confirm_password {
            return Err(ValidationError::PasswordMismatch.into());
        }
        if request.password.is_empty() {
            return Err(Error::Identity("Password is required".to_string()));
        }

        let id = Uuid::new_v4().to_string();
        let hash = hash_password(&request.password)?;
        let user = self.db.insert_user(&id, email, request.name.trim(), &hash)?;
        info!(user_id = %user.id, "User signed up");
        Ok(user)
    }

    fn sign_in(&self, email: &str, password: &str) -> Result<User> {
        let Some((user, hash)) = self.db.find_user_credentials(email)? else {
            return Err(ValidationError::InvalidCredentials.into());
        };
        if !password_matches(password, &hash)? {
            warn!(user_id = %user.id, "Failed sign-in");
            return Err(ValidationError::InvalidCredentials.into());
        }
        Ok(user)
    }

    fn get_user(&self, user_id: &str) -> Result<Option<User>> {
        self.db.get_user(user_id)
    }

    fn update_account(&self, user_id: &str, update: &AccountUpdate) -> Result<User> {
        let hash = match &update.password {
            Some(password) if !password.is_empty() => {
                if update.confirm_password.as_deref() != Some(password.as_str()) {
                    return Err(ValidationError::PasswordMismatch.into());
                }
                Some(hash_password(password)?)
            }
            _ => None,
        };

        let email = update.email.as_deref().map(str::trim).filter(|e| !e.is_empty());
        let name = update.name.as_deref().map(str::trim);

        let user = self.db.update_user(user_id, email, name, hash.as_deref())?;
        info!(user_id = %user.id, password_changed = hash.is_some(), "Account updated");
        Ok(user)
    }

    fn verify_password(&self, user_id: &str, password: &str) -> Result<bool> {
        match self.db.get_password_hash(user_id)? {
            Some(hash) => password_matches(password, &hash),
            None => Ok(false),
        }
    }

    fn delete_user(&self, user_id: &str) -> Result<()> {
        if !self.db.delete_user(user_id)? {
            return Err(Error::Identity(format!("User not found: {}", user_id)));
        }
        info!(user_id = %user_id, "Identity record deleted");
        Ok(())
    }
}
