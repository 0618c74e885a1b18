//! Stats command implementation

use anyhow::Result;
use pocketbook_core::models::ActivityItem;
use pocketbook_core::{Database, Ledger, Period, ViewPeriod};

use super::{format_amount, today, truncate};

/// Resolve the `--period`/`--date` pair, defaulting to today
pub fn resolve_period(view: ViewPeriod, selector: Option<&str>) -> Result<Period> {
    match selector {
        Some(s) => Ok(Period::from_selector(view, s)?),
        None => Ok(Period::new(view, today())),
    }
}

pub fn cmd_stats(db: &Database, user_id: &str, period: Period, json: bool) -> Result<()> {
    let dashboard = Ledger::for_user(db, user_id).dashboard(period)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&dashboard)?);
        return Ok(());
    }

    let stats = &dashboard.stats;

    println!();
    println!("📊 {} view: {}", period.view, period.selector());
    println!("   ─────────────────────────────");
    println!("   Income:        {:>12}", format_amount(stats.income));
    println!("   Expenses:      {:>12}", format_amount(stats.expenses));
    println!("   Balance:       {:>12}", format_amount(stats.balance));
    println!("   Saved (view):  {:>12}", format_amount(stats.period_savings));
    println!("   Saved (total): {:>12}", format_amount(stats.savings));
    println!("   Loans owed:    {:>12}", format_amount(stats.loan_balance));

    if !dashboard.expense_categories.is_empty() {
        println!();
        println!("   Expenses by category");
        for share in &dashboard.expense_categories {
            println!(
                "     {:<20} {:>10}  {:>5}%",
                truncate(&share.category, 20),
                format_amount(share.amount),
                share.percentage
            );
        }
    }

    if !stats.feed.is_empty() {
        println!();
        println!("   Activity on {}", period.anchor);
        for item in &stats.feed {
            match item {
                ActivityItem::Transaction(tx) => println!(
                    "     {:<8} {:>10}  {}",
                    tx.kind.as_str(),
                    format_amount(tx.amount),
                    truncate(&tx.description, 40)
                ),
                ActivityItem::Loan(loan) => println!(
                    "     {:<8} {:>10}  {} {}",
                    loan.loan_action.as_str(),
                    format_amount(loan.amount),
                    loan.name,
                    truncate(&loan.description, 30)
                ),
            }
        }
    }

    Ok(())
}
