//! Entry and transaction command implementations

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use pocketbook_core::models::TransactionType;
use pocketbook_core::{Database, EntryForm, EntryOutcome, Ledger, Period, ViewPeriod};
use rust_decimal::Decimal;

use super::{format_amount, today, truncate};

/// Arguments of `pocketbook add`
pub struct AddEntry<'a> {
    pub kind: TransactionType,
    pub amount: Decimal,
    pub description: &'a str,
    pub category: &'a str,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub period: ViewPeriod,
}

pub fn cmd_add(db: &Database, user_id: &str, entry: &AddEntry<'_>) -> Result<()> {
    let date = entry.date.unwrap_or_else(today);
    let form = EntryForm {
        description: entry.description.to_string(),
        category: entry.category.to_string(),
        time: entry.time,
        ..EntryForm::new(entry.kind.as_str(), entry.amount, date)
    };

    let ledger = Ledger::for_user(db, user_id);
    let outcome = ledger.submit(&form, &Period::new(entry.period, date))?;

    if let EntryOutcome::Transaction(tx) = outcome {
        println!(
            "✅ Recorded {} {} on {} (id {})",
            tx.kind,
            format_amount(tx.amount),
            tx.date.format("%Y-%m-%d"),
            tx.id
        );
    }

    Ok(())
}

pub fn cmd_transactions_list(db: &Database, user_id: &str, limit: usize, json: bool) -> Result<()> {
    let transactions: Vec<_> = Ledger::for_user(db, user_id)
        .transactions()?
        .into_iter()
        .take(limit)
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&transactions)?);
        return Ok(());
    }

    if transactions.is_empty() {
        println!("No transactions found. Record one with:");
        println!("  pocketbook add --user {} --type income 100", user_id);
        return Ok(());
    }

    println!();
    println!("📝 Recent Transactions");
    println!("   ─────────────────────────────────────────────────────────────");

    for tx in transactions {
        let amount = if tx.kind == TransactionType::Savings {
            format_amount(tx.savings)
        } else {
            format_amount(tx.amount)
        };

        println!(
            "   {} │ {:<8} │ {:>10} │ {}",
            tx.date.format("%Y-%m-%d"),
            tx.kind,
            amount,
            truncate(&tx.description, 40)
        );
    }

    Ok(())
}
