//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `accounts` - Sign-up and account deletion
//! - `core` - Init command and shared utilities (open_db, today)
//! - `goals` - Goal commands (list, add, toggle)
//! - `loans` - Loan commands (take, clear, list)
//! - `rollover` - Month-end rollover
//! - `serve` - Web server command
//! - `stats` - Period stats summary
//! - `transactions` - Entry and transaction listing commands

pub mod accounts;
pub mod core;
pub mod goals;
pub mod loans;
pub mod rollover;
pub mod serve;
pub mod stats;
pub mod transactions;

// Re-export command functions for main.rs
pub use accounts::*;
pub use core::*;
pub use goals::*;
pub use loans::*;
pub use rollover::*;
pub use serve::*;
pub use stats::*;
pub use transactions::*;

use rust_decimal::Decimal;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Two-decimal money string, colored red when negative
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    if amount < Decimal::ZERO {
        format!("\x1b[31m-{:.2}\x1b[0m", rounded.abs())
    } else {
        format!("{:.2}", rounded)
    }
}
