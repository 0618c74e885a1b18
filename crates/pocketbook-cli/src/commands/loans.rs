//! Loan command implementations

use anyhow::{bail, Result};
use chrono::NaiveDate;
use pocketbook_core::models::{LoanEventRecord, LoanTarget};
use pocketbook_core::{Database, Ledger};
use rust_decimal::Decimal;

use super::{format_amount, today};

fn start_of_day(date: Option<NaiveDate>) -> chrono::DateTime<chrono::Utc> {
    date.unwrap_or_else(today)
        .and_time(chrono::NaiveTime::MIN)
        .and_utc()
}

fn print_record(verb: &str, record: &LoanEventRecord) {
    println!(
        "✅ {} {} ({} remaining of loan {} with {})",
        verb,
        format_amount(record.mirror.amount.abs()),
        format_amount(record.loan.remaining_amount),
        record.loan.id,
        record.loan.name
    );
}

pub fn cmd_loan_take(
    db: &Database,
    user_id: &str,
    amount: Decimal,
    name: Option<&str>,
    loan_id: Option<i64>,
    note: &str,
    date: Option<NaiveDate>,
) -> Result<()> {
    let target = match (loan_id, name) {
        (Some(loan_id), _) => LoanTarget::Existing { loan_id },
        (None, Some(name)) => LoanTarget::New {
            name: name.to_string(),
        },
        (None, None) => bail!("Pass --name for a new counterparty or --loan-id for an existing loan"),
    };

    let record = Ledger::for_user(db, user_id).take_loan(target, amount, start_of_day(date), note)?;
    print_record("Took", &record);
    Ok(())
}

pub fn cmd_loan_clear(
    db: &Database,
    user_id: &str,
    loan_id: i64,
    amount: Decimal,
    note: &str,
    date: Option<NaiveDate>,
) -> Result<()> {
    let record =
        Ledger::for_user(db, user_id).clear_loan(loan_id, amount, start_of_day(date), note)?;
    print_record("Cleared", &record);
    Ok(())
}

pub fn cmd_loans_list(db: &Database, user_id: &str, active_only: bool) -> Result<()> {
    let ledger = Ledger::for_user(db, user_id);
    let loans = if active_only {
        ledger.active_loans()?
    } else {
        ledger.loans()?
    };

    if loans.is_empty() {
        println!("No loans.");
        return Ok(());
    }

    println!();
    println!("🤝 Loans");
    println!("   ─────────────────────────────────────────────────────────────");

    for loan in &loans {
        println!(
            "   [{}] {:<20} │ remaining {:>10} │ borrowed {:>10} │ {}",
            loan.id,
            loan.name,
            format_amount(loan.remaining_amount),
            format_amount(loan.principal_borrowed()),
            if loan.is_active() { "active" } else { "settled" }
        );
        for event in &loan.events {
            println!(
                "        {} {:<5} {:>10}  {}",
                event.date.format("%Y-%m-%d"),
                event.action.as_str(),
                format_amount(event.amount),
                event.note
            );
        }
    }

    println!();
    println!(
        "   Outstanding: {}",
        format_amount(loans.iter().map(|l| l.remaining_amount).sum())
    );

    Ok(())
}
