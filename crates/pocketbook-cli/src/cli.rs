//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use pocketbook_core::models::{GoalType, TransactionType};
use pocketbook_core::ViewPeriod;
use rust_decimal::Decimal;

/// Pocketbook - Track income, expenses, savings and loans
#[derive(Parser)]
#[command(name = "pocketbook")]
#[command(about = "Personal finance ledger with loans, goals and month-end savings", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "pocketbook.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set POCKETBOOK_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, every /api request needs a key from POCKETBOOK_API_KEYS.
        #[arg(long)]
        no_auth: bool,
    },

    /// Register a local account
    Signup {
        #[arg(long)]
        email: String,

        /// Display name
        #[arg(long, default_value = "")]
        name: String,

        #[arg(long)]
        password: String,
    },

    /// Record an income, expense or savings entry
    Add {
        /// User id
        #[arg(short, long)]
        user: String,

        /// income, expense or savings
        #[arg(short = 't', long = "type")]
        kind: TransactionType,

        amount: Decimal,

        #[arg(short, long, default_value = "")]
        description: String,

        #[arg(short, long, default_value = "")]
        category: String,

        /// Entry date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Time of day, HH:MM:SS (defaults to midnight)
        #[arg(long)]
        time: Option<NaiveTime>,

        /// View the savings balance is checked against: daily, monthly, yearly
        #[arg(long, default_value = "monthly")]
        period: ViewPeriod,
    },

    /// Take or clear loans
    Loan {
        #[command(subcommand)]
        action: LoanCommand,
    },

    /// List transactions, newest first
    Transactions {
        #[arg(short, long)]
        user: String,

        /// Maximum number to show
        #[arg(short, long, default_value = "20")]
        limit: usize,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// List loans
    Loans {
        #[arg(short, long)]
        user: String,

        /// Only loans with an outstanding balance
        #[arg(long)]
        active: bool,
    },

    /// Show stats for a day, month or year
    Stats {
        #[arg(short, long)]
        user: String,

        /// daily, monthly or yearly
        #[arg(short, long, default_value = "monthly")]
        period: ViewPeriod,

        /// YYYY-MM-DD, YYYY-MM or YYYY (defaults to today)
        #[arg(long)]
        date: Option<String>,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Manage savings goals
    Goals {
        #[command(subcommand)]
        action: GoalsCommand,
    },

    /// Run the month-end rollover now
    Rollover {
        /// Only this user (defaults to every user)
        #[arg(short, long)]
        user: Option<String>,
    },

    /// Delete an account and all of its data
    DeleteAccount {
        #[arg(short, long)]
        user: String,

        /// Current password, re-verified before anything is removed
        #[arg(long)]
        password: String,
    },
}

#[derive(Subcommand)]
pub enum LoanCommand {
    /// Borrow money, from a new counterparty (--name) or an existing loan (--loan-id)
    Take {
        #[arg(short, long)]
        user: String,

        amount: Decimal,

        /// New counterparty name
        #[arg(long, conflicts_with = "loan_id")]
        name: Option<String>,

        /// Existing loan to add to
        #[arg(long)]
        loan_id: Option<i64>,

        #[arg(long, default_value = "")]
        note: String,

        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Repay part or all of a loan
    Clear {
        #[arg(short, long)]
        user: String,

        loan_id: i64,

        amount: Decimal,

        #[arg(long, default_value = "")]
        note: String,

        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
pub enum GoalsCommand {
    /// List goals with progress
    List {
        #[arg(short, long)]
        user: String,

        /// Only monthly or yearly goals created in the selected period
        #[arg(short = 't', long = "type")]
        kind: Option<GoalType>,

        /// YYYY-MM for monthly, YYYY for yearly (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Add a goal
    Add {
        #[arg(short, long)]
        user: String,

        /// monthly or yearly
        #[arg(short = 't', long = "type")]
        kind: GoalType,

        amount: Decimal,

        #[arg(short, long, default_value = "")]
        description: String,

        /// YYYY-MM for monthly, YYYY for yearly (defaults to the next one)
        #[arg(long)]
        target: Option<String>,

        /// 1 = highest
        #[arg(long, default_value = "1")]
        priority: i64,
    },

    /// Flip a goal between pending and completed
    Toggle {
        #[arg(short, long)]
        user: String,

        id: i64,
    },
}
