//! Integration tests for pocketbook-core
//!
//! These tests exercise the full record → aggregate → roll over workflow
//! through the public `Ledger` API.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use pocketbook_core::{
    models::{GoalType, LoanTarget, NewGoal, NewTransaction, TransactionType},
    Database, Error, FixedClock, Ledger, Period, RolloverJob, RolloverOutcome, ValidationError,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// =============================================================================
// Ledger Scenarios
// =============================================================================

#[test]
fn test_new_user_has_zero_stats() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let ledger = Ledger::for_user(&db, "fresh-user");

    for period in [
        Period::daily(date(2024, 3, 5)),
        Period::monthly(date(2024, 3, 1)),
        Period::yearly(date(2024, 1, 1)),
    ] {
        let stats = ledger.stats(&period).unwrap();
        assert_eq!(stats.income, Decimal::ZERO);
        assert_eq!(stats.expenses, Decimal::ZERO);
        assert_eq!(stats.savings, Decimal::ZERO);
        assert_eq!(stats.balance, Decimal::ZERO);
        assert_eq!(stats.loan_balance, Decimal::ZERO);
    }
}

#[test]
fn test_loan_take_clear_workflow() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let ledger = Ledger::for_user(&db, "u1");

    // Take 500 from Alice
    let taken = ledger
        .take_loan(
            LoanTarget::New {
                name: "Alice".to_string(),
            },
            dec!(500),
            at(2024, 3, 1, 10),
            "emergency",
        )
        .expect("Failed to take loan");
    assert_eq!(taken.loan.total_amount, dec!(500));
    assert_eq!(taken.loan.remaining_amount, dec!(500));
    assert_eq!(taken.mirror.amount, dec!(500));
    assert_eq!(ledger.loan_balance().unwrap(), dec!(500));

    // Clear 200
    let cleared = ledger
        .clear_loan(taken.loan.id, dec!(200), at(2024, 3, 2, 10), "")
        .expect("Failed to clear loan");
    assert_eq!(cleared.loan.remaining_amount, dec!(300));
    assert_eq!(cleared.mirror.amount, dec!(-200));

    // Clearing 400 next is rejected and nothing changes
    let err = ledger
        .clear_loan(taken.loan.id, dec!(400), at(2024, 3, 3, 10), "")
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::ClearExceedsRemaining { .. })
    ));

    let loans = ledger.loans().unwrap();
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0].remaining_amount, dec!(300));
    assert_eq!(loans[0].events.len(), 2);
    assert_eq!(ledger.transactions().unwrap().len(), 2);

    // The co-indexed views stay aligned
    let loan = &loans[0];
    assert_eq!(loan.descriptions().len(), loan.dates().len());
    assert_eq!(loan.amounts().len(), loan.actions().len());
    assert_eq!(loan.descriptions(), vec!["emergency", ""]);

    // Loan mirrors never count as income
    let stats = ledger.stats(&Period::monthly(date(2024, 3, 1))).unwrap();
    assert_eq!(stats.income, Decimal::ZERO);
    assert_eq!(stats.balance, Decimal::ZERO);
    assert_eq!(stats.loan_balance, dec!(300));
}

#[test]
fn test_savings_rejected_when_loans_outstanding() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let ledger = Ledger::for_user(&db, "u1");
    let march = Period::monthly(date(2024, 3, 1));

    ledger
        .record_transaction(
            &NewTransaction::new(TransactionType::Income, dec!(1000), "salary", "Work", at(2024, 3, 1, 9)),
            &march,
        )
        .unwrap();
    ledger
        .take_loan(
            LoanTarget::New {
                name: "Bank".to_string(),
            },
            dec!(1000),
            at(2024, 3, 1, 10),
            "",
        )
        .unwrap();

    let stats = ledger.stats(&march).unwrap();
    assert_eq!(stats.balance, dec!(1000));
    assert_eq!(stats.loan_balance, dec!(1000));

    let err = ledger
        .record_transaction(
            &NewTransaction::savings(dec!(100), "", "", at(2024, 3, 2, 9)),
            &march,
        )
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::LoansOutstanding)
    ));
    assert_eq!(ledger.stats(&march).unwrap().savings, Decimal::ZERO);
}

#[test]
fn test_goal_progress_from_savings() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let ledger = Ledger::for_user(&db, "u1");
    let march = Period::monthly(date(2024, 3, 1));

    ledger
        .record_transaction(
            &NewTransaction::new(TransactionType::Income, dec!(2000), "", "", at(2024, 3, 1, 9)),
            &march,
        )
        .unwrap();
    ledger
        .record_transaction(
            &NewTransaction::savings(dec!(250), "", "", at(2024, 3, 2, 9)),
            &march,
        )
        .unwrap();
    ledger
        .add_goal(
            &NewGoal {
                kind: GoalType::Monthly,
                amount: dec!(1000),
                description: "Camera".to_string(),
                target_date: date(2024, 4, 1),
                priority: 1,
            },
            at(2024, 3, 1, 12),
        )
        .unwrap();

    let views = ledger.goal_views(GoalType::Monthly, date(2024, 3, 1)).unwrap();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].progress.total_saved, dec!(250));
    assert_eq!(views[0].progress.progress_percentage, dec!(25.0));
    assert_eq!(views[0].progress.remaining, dec!(750));

    // Not shown for another month
    assert!(ledger
        .goal_views(GoalType::Monthly, date(2024, 4, 1))
        .unwrap()
        .is_empty());
}

#[test]
fn test_month_end_rollover_once_per_month() {
    let db = Database::in_memory().expect("Failed to create in-memory database");
    let ledger = Ledger::for_user(&db, "u1");
    let last_day = Period::daily(date(2024, 4, 30));

    ledger
        .record_transaction(
            &NewTransaction::new(TransactionType::Income, dec!(80), "", "", at(2024, 4, 30, 9)),
            &last_day,
        )
        .unwrap();

    let job = RolloverJob::new(Arc::new(FixedClock::at_date(date(2024, 4, 30))));
    let first = job.run(&ledger).unwrap();
    assert!(first.is_rolled());
    assert_eq!(job.run(&ledger).unwrap(), RolloverOutcome::AlreadyRolledOver);

    let stats = ledger.stats(&last_day).unwrap();
    assert_eq!(stats.savings, dec!(80));
    // The rollover row has zero amount, so the balance is untouched
    assert_eq!(stats.balance, dec!(80));

    let next_month = RolloverJob::new(Arc::new(FixedClock::at_date(date(2024, 5, 15))));
    assert_eq!(next_month.run(&ledger).unwrap(), RolloverOutcome::NotMonthEnd);
}

#[test]
fn test_database_reopen_keeps_ledger() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("pocketbook.db");
    let path = path.to_string_lossy();

    {
        let db = Database::new_unencrypted(&path).unwrap();
        Ledger::for_user(&db, "u1")
            .take_loan(
                LoanTarget::New {
                    name: "Alice".to_string(),
                },
                dec!(42),
                at(2024, 3, 1, 10),
                "",
            )
            .unwrap();
    }

    let db = Database::new_unencrypted(&path).unwrap();
    let loans = Ledger::for_user(&db, "u1").loans().unwrap();
    assert_eq!(loans.len(), 1);
    assert_eq!(loans[0].remaining_amount, dec!(42));
}
