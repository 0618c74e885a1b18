//! Pocketbook Core Library
//!
//! Ledger and aggregation engine for the Pocketbook personal finance tracker:
//! - Database access and migrations (transactions, loans, goals, users)
//! - Per-user ledger with atomic loan events and mirrored transactions
//! - Period-based stats aggregation, chart buckets and category shares
//! - Savings goal tracker
//! - Idempotent end-of-month rollover job
//! - Identity provider and object store interfaces with local implementations
//! - Account deletion routine

pub mod account;
pub mod clock;
pub mod db;
pub mod entry;
pub mod error;
pub mod goals;
pub mod identity;
pub mod ledger;
pub mod models;
pub mod period;
pub mod rollover;
pub mod stats;
pub mod storage;

pub use account::{delete_user_data, DeletionError, DeletionReport};
pub use clock::{Clock, FixedClock, SystemClock};
pub use db::Database;
pub use entry::{Entry, EntryForm, EntryOutcome};
pub use error::{Error, Result, ValidationError};
pub use goals::GoalView;
pub use identity::{AccountUpdate, IdentityProvider, LocalIdentity, SignUp};
pub use ledger::{Ledger, Snapshot};
pub use period::{Period, ViewPeriod};
pub use rollover::{RolloverJob, RolloverOutcome};
pub use stats::Dashboard;
pub use storage::{LocalObjectStore, ObjectStore, PROFILE_BUCKET};
