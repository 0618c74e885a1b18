//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `today` - Current UTC date
//! - `cmd_init` - Initialize the database

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use pocketbook_core::{Clock, Database, SystemClock};

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .context("Database path must be valid UTF-8")?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Today's date in UTC
pub fn today() -> NaiveDate {
    SystemClock.today()
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        let encrypted = db.is_encrypted().unwrap_or(false);
        println!(
            "   🔒 Encryption: {}",
            if encrypted { "ENABLED" } else { "UNKNOWN" }
        );
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Create an account: pocketbook signup --email you@example.com --password ...");
    println!("  2. Record income: pocketbook add --user <id> --type income 1000");
    println!("  3. Start web API: pocketbook serve");

    Ok(())
}
