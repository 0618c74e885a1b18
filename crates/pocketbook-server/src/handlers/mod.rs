//! HTTP request handlers

pub mod auth;
pub mod dashboard;
pub mod delete_user;
pub mod entries;
pub mod goals;
pub mod loans;
pub mod profile;
pub mod rollover;
pub mod users;

pub use auth::*;
pub use dashboard::*;
pub use delete_user::*;
pub use entries::*;
pub use goals::*;
pub use loans::*;
pub use profile::*;
pub use rollover::*;
pub use users::*;
