//! Background month-end rollover
//!
//! Enabled via environment variable:
//!
//! - `POCKETBOOK_ROLLOVER_SCHEDULE`: Interval in minutes (e.g., "60" for hourly)
//!
//! Each tick evaluates the rollover rule for every user with a ledger. The
//! rule itself is idempotent per user and month, so the interval only bounds
//! how late on the last day the savings row appears.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::interval;
use tracing::{error, info, warn};

use pocketbook_core::{Clock, Database, Ledger, RolloverJob};

/// Environment variable holding the interval in minutes
pub const ROLLOVER_SCHEDULE_ENV: &str = "POCKETBOOK_ROLLOVER_SCHEDULE";

/// Configuration for the scheduled rollover
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverScheduleConfig {
    /// Interval between runs in minutes
    pub interval_minutes: u64,
}

impl RolloverScheduleConfig {
    /// Parse configuration from environment variables
    ///
    /// Returns None if scheduling is not configured
    pub fn from_env() -> Option<Self> {
        Self::parse(std::env::var(ROLLOVER_SCHEDULE_ENV).ok().as_deref())
    }

    fn parse(value: Option<&str>) -> Option<Self> {
        let interval_minutes: u64 = value.and_then(|s| s.trim().parse().ok())?;

        if interval_minutes == 0 {
            warn!("{} is 0, scheduled rollover disabled", ROLLOVER_SCHEDULE_ENV);
            return None;
        }

        Some(Self { interval_minutes })
    }
}

/// Start the rollover scheduler as a background task
pub fn start_rollover_scheduler(
    db: Database,
    clock: Arc<dyn Clock>,
    config: RolloverScheduleConfig,
) {
    info!(
        "Starting rollover scheduler: every {} minute(s)",
        config.interval_minutes
    );

    tokio::spawn(async move {
        let job = RolloverJob::new(clock);
        let mut ticker = interval(Duration::from_secs(config.interval_minutes * 60));

        loop {
            ticker.tick().await;

            match run_rollover_for_all(&db, &job) {
                Ok(rolled) if rolled > 0 => {
                    info!("Scheduled rollover recorded savings for {} user(s)", rolled)
                }
                Ok(_) => {}
                Err(e) => error!("Scheduled rollover failed: {}", e),
            }
        }
    });
}

/// Run the rollover rule for every known user
///
/// A failure for one user is logged and does not stop the others. Returns how
/// many users had savings recorded.
pub fn run_rollover_for_all(db: &Database, job: &RolloverJob) -> pocketbook_core::Result<usize> {
    let mut rolled = 0;

    for user_id in db.list_ledger_user_ids()? {
        let ledger = Ledger::for_user(db, user_id.as_str());
        match job.run(&ledger) {
            Ok(outcome) if outcome.is_rolled() => rolled += 1,
            Ok(_) => {}
            Err(e) => warn!(user_id = %user_id, error = %e, "Rollover failed for user"),
        }
    }

    Ok(rolled)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pocketbook_core::models::{NewTransaction, TransactionType};
    use pocketbook_core::FixedClock;
    use rust_decimal_macros::dec;

    #[test]
    fn test_config_not_set() {
        assert!(RolloverScheduleConfig::parse(None).is_none());
    }

    #[test]
    fn test_config_zero_disables() {
        assert!(RolloverScheduleConfig::parse(Some("0")).is_none());
        assert!(RolloverScheduleConfig::parse(Some("soon")).is_none());
    }

    #[test]
    fn test_config_minutes() {
        assert_eq!(
            RolloverScheduleConfig::parse(Some(" 30 ")),
            Some(RolloverScheduleConfig {
                interval_minutes: 30
            })
        );
    }

    #[test]
    fn test_run_for_all_users() {
        let db = Database::in_memory().unwrap();
        let last_day = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let morning = last_day.and_hms_opt(9, 0, 0).unwrap().and_utc();

        for (user, amount) in [("a", dec!(50)), ("b", dec!(20))] {
            db.insert_transaction(
                user,
                &NewTransaction::new(TransactionType::Income, amount, "", "", morning),
            )
            .unwrap();
        }
        // Spent everything: nothing to roll over
        db.insert_transaction(
            "b",
            &NewTransaction::new(TransactionType::Expense, dec!(20), "", "", morning),
        )
        .unwrap();

        let job = RolloverJob::new(Arc::new(FixedClock::at_date(last_day)));
        assert_eq!(run_rollover_for_all(&db, &job).unwrap(), 1);
        // Second tick the same day is a no-op
        assert_eq!(run_rollover_for_all(&db, &job).unwrap(), 0);
    }
}
