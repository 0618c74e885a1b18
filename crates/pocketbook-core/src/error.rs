//! Error types for Pocketbook

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Database pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Encryption error: {0}")]
    Encryption(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Decimal error: {0}")]
    Decimal(#[from] rust_decimal::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Identity error: {0}")]
    Identity(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Rejections detected before any write is attempted.
///
/// The display strings are user-facing and are returned verbatim by the API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid transaction type: {0}")]
    InvalidTransactionType(String),

    #[error("Amount must be greater than zero")]
    NonPositiveAmount,

    #[error("Amount cannot exceed {0}")]
    AmountTooLarge(Decimal),

    #[error("Select a loan action (take or clear)")]
    MissingLoanAction,

    #[error("Loan name is required")]
    MissingCounterparty,

    #[error("A loan for {0} already exists; take against the existing loan instead")]
    DuplicateCounterparty(String),

    #[error("Selected loan not found.")]
    LoanNotFound,

    #[error("Clear amount exceeds remaining loan amount ({requested} > {remaining}).")]
    ClearExceedsRemaining {
        requested: Decimal,
        remaining: Decimal,
    },

    #[error("Savings amount should be less than the current balance.")]
    SavingsExceedBalance,

    #[error("You have loans to clear. Please clear them first to make savings.")]
    LoansOutstanding,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Invalid login details")]
    InvalidCredentials,

    #[error("Invalid period selector: {0}")]
    InvalidPeriod(String),

    #[error("Invalid goal: {0}")]
    InvalidGoal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
