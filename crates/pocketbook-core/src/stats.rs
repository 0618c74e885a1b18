//! Stats aggregation
//!
//! Everything here is a pure function over a full ledger snapshot
//! (transactions + loans) and a [`Period`]. Nothing is cached: callers
//! recompute from the snapshot on every read.

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;
use crate::models::{
    ActivityItem, CategoryShare, ChartBucket, Loan, LoanActivity, Stats, Transaction,
    TransactionType,
};
use crate::period::Period;

/// Sum of remaining amounts across every loan of a user
pub fn aggregate_loan_balance(loans: &[Loan]) -> Decimal {
    loans
        .iter()
        .fold(Decimal::ZERO, |acc, l| acc.saturating_add(l.remaining_amount))
}

/// Expand each loan's history into one activity record per event
pub fn loan_activity(loans: &[Loan]) -> Vec<LoanActivity> {
    loans
        .iter()
        .flat_map(|loan| {
            loan.events.iter().map(move |event| LoanActivity {
                loan_id: loan.id,
                seq: event.seq,
                loan_action: event.action,
                name: loan.name.clone(),
                description: event.note.clone(),
                amount: event.amount,
                date: event.date,
            })
        })
        .collect()
}

/// Plain (non loan-mirror) transactions inside the period
fn period_transactions<'a>(
    period: &'a Period,
    transactions: &'a [Transaction],
) -> impl Iterator<Item = &'a Transaction> + 'a {
    transactions
        .iter()
        .filter(move |t| period.contains(t.date) && !t.is_loan_mirror())
}

fn sum_amount<'a>(
    txs: impl Iterator<Item = &'a Transaction>,
    kind: TransactionType,
) -> Decimal {
    txs.filter(|t| t.kind == kind)
        .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.amount))
}

fn sum_savings<'a>(txs: impl Iterator<Item = &'a Transaction>) -> Decimal {
    txs.filter(|t| t.kind == TransactionType::Savings)
        .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.savings))
}

/// Aggregate income, expenses, savings, balance and the anchor-day feed
pub fn compute_stats(period: &Period, transactions: &[Transaction], loans: &[Loan]) -> Stats {
    let plain: Vec<&Transaction> = period_transactions(period, transactions).collect();

    let income = sum_amount(plain.iter().copied(), TransactionType::Income);
    let expenses = sum_amount(plain.iter().copied(), TransactionType::Expense);
    let period_savings = sum_savings(plain.iter().copied());
    // All-time, independent of the view period
    let savings = sum_savings(transactions.iter());

    let mut feed: Vec<ActivityItem> = plain
        .iter()
        .filter(|t| period.is_anchor_day(t.date))
        .map(|t| ActivityItem::Transaction((*t).clone()))
        .chain(
            loan_activity(loans)
                .into_iter()
                .filter(|a| period.contains(a.date) && period.is_anchor_day(a.date))
                .map(ActivityItem::Loan),
        )
        .collect();
    feed.sort_by(|a, b| b.date().cmp(&a.date()));

    let stats = Stats {
        income,
        expenses,
        savings,
        period_savings,
        balance: income.saturating_sub(expenses),
        loan_balance: aggregate_loan_balance(loans),
        feed,
    };

    debug!(
        view = %period.view,
        anchor = %period.anchor,
        income = %stats.income,
        expenses = %stats.expenses,
        balance = %stats.balance,
        feed = stats.feed.len(),
        "Computed stats"
    );

    stats
}

/// Savings guard: the amount must fit in the balance and leave enough to
/// cover every outstanding loan.
pub fn check_savings(
    amount: Decimal,
    balance: Decimal,
    loan_balance: Decimal,
) -> std::result::Result<(), ValidationError> {
    if amount <= Decimal::ZERO {
        return Err(ValidationError::NonPositiveAmount);
    }
    if amount > balance {
        return Err(ValidationError::SavingsExceedBalance);
    }
    if balance.saturating_sub(amount) < loan_balance {
        return Err(ValidationError::LoansOutstanding);
    }
    Ok(())
}

/// Per-bucket income/expense/savings totals for the chart, oldest bucket first
pub fn chart_buckets(period: &Period, transactions: &[Transaction]) -> Vec<ChartBucket> {
    let mut buckets: BTreeMap<chrono::NaiveDate, ChartBucket> = BTreeMap::new();

    for tx in period_transactions(period, transactions) {
        let date = tx.date.date_naive();
        let bucket = buckets
            .entry(period.bucket_start(date))
            .or_insert_with(|| ChartBucket {
                date: period.bucket_key(date),
                income: Decimal::ZERO,
                expenses: Decimal::ZERO,
                savings: Decimal::ZERO,
            });

        match tx.kind {
            TransactionType::Income => bucket.income = bucket.income.saturating_add(tx.amount),
            TransactionType::Expense => {
                bucket.expenses = bucket.expenses.saturating_add(tx.amount)
            }
            TransactionType::Savings => bucket.savings = bucket.savings.saturating_add(tx.savings),
        }
    }

    buckets.into_values().collect()
}

/// Share of `part` in `total`, in percent with one decimal place (0 when total is 0)
///
/// A share too large to represent saturates at `Decimal::MAX` (or `MIN`).
pub fn percentage_of(part: Decimal, total: Decimal) -> Decimal {
    if total.is_zero() {
        return Decimal::ZERO;
    }
    match part
        .checked_div(total)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
    {
        Some(share) => share.round_dp(1),
        None if part.is_sign_negative() != total.is_sign_negative() => Decimal::MIN,
        None => Decimal::MAX,
    }
}

/// Category totals of one transaction type within the period, largest first
pub fn category_breakdown(
    period: &Period,
    transactions: &[Transaction],
    kind: TransactionType,
) -> Vec<CategoryShare> {
    let mut totals: HashMap<&str, Decimal> = HashMap::new();
    let mut total = Decimal::ZERO;

    for tx in period_transactions(period, transactions).filter(|t| t.kind == kind) {
        let category_total = totals.entry(tx.category.as_str()).or_default();
        *category_total = category_total.saturating_add(tx.amount);
        total = total.saturating_add(tx.amount);
    }

    let mut shares: Vec<CategoryShare> = totals
        .into_iter()
        .map(|(category, amount)| CategoryShare {
            category: category.to_string(),
            amount,
            percentage: percentage_of(amount, total),
        })
        .collect();
    shares.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then_with(|| a.category.cmp(&b.category))
    });
    shares
}

/// Everything the dashboard renders for one view period
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dashboard {
    pub period: Period,
    pub stats: Stats,
    pub chart: Vec<ChartBucket>,
    pub expense_categories: Vec<CategoryShare>,
    pub income_categories: Vec<CategoryShare>,
}

impl Dashboard {
    pub fn build(period: Period, transactions: &[Transaction], loans: &[Loan]) -> Self {
        Self {
            stats: compute_stats(&period, transactions, loans),
            chart: chart_buckets(&period, transactions),
            expense_categories: category_breakdown(&period, transactions, TransactionType::Expense),
            income_categories: category_breakdown(&period, transactions, TransactionType::Income),
            period,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LoanAction, LoanEvent};
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tx(id: i64, kind: TransactionType, amount: Decimal, desc: &str, category: &str, when: DateTime<Utc>) -> Transaction {
        Transaction {
            id,
            user_id: "u1".to_string(),
            kind,
            amount,
            savings: if kind == TransactionType::Savings { amount } else { Decimal::ZERO },
            description: desc.to_string(),
            category: category.to_string(),
            date: when,
            created_at: when,
        }
    }

    fn loan(remaining: Decimal, events: Vec<(LoanAction, Decimal, DateTime<Utc>)>) -> Loan {
        Loan {
            id: 1,
            user_id: "u1".to_string(),
            name: "Alice".to_string(),
            total_amount: remaining,
            remaining_amount: remaining,
            events: events
                .into_iter()
                .enumerate()
                .map(|(i, (action, amount, date))| LoanEvent {
                    seq: i as i64,
                    action,
                    amount,
                    date,
                    note: format!("event {}", i),
                })
                .collect(),
        }
    }

    #[test]
    fn test_empty_ledger_is_all_zero() {
        let stats = compute_stats(&Period::monthly(date(2024, 3, 1)), &[], &[]);
        assert_eq!(stats.income, Decimal::ZERO);
        assert_eq!(stats.expenses, Decimal::ZERO);
        assert_eq!(stats.savings, Decimal::ZERO);
        assert_eq!(stats.balance, Decimal::ZERO);
        assert_eq!(stats.loan_balance, Decimal::ZERO);
        assert!(stats.feed.is_empty());
    }

    #[test]
    fn test_balance_excludes_loan_mirrors() {
        let txs = vec![
            tx(1, TransactionType::Income, dec!(1000), "salary", "Work", at(2024, 3, 5, 9)),
            tx(2, TransactionType::Expense, dec!(250), "groceries", "Food", at(2024, 3, 6, 9)),
            tx(3, TransactionType::Income, dec!(500), "Loan taken: Alice", "Loan", at(2024, 3, 7, 9)),
            tx(4, TransactionType::Income, dec!(-200), "Loan cleared: Alice", "Loan", at(2024, 3, 8, 9)),
            tx(5, TransactionType::Income, dec!(99), "last month", "Work", at(2024, 2, 28, 9)),
        ];

        let stats = compute_stats(&Period::monthly(date(2024, 3, 1)), &txs, &[]);
        assert_eq!(stats.income, dec!(1000));
        assert_eq!(stats.expenses, dec!(250));
        assert_eq!(stats.balance, dec!(750));
    }

    #[test]
    fn test_savings_is_all_time_and_period_savings_is_scoped() {
        let txs = vec![
            tx(1, TransactionType::Savings, dec!(100), "", "", at(2023, 12, 31, 9)),
            tx(2, TransactionType::Savings, dec!(40), "", "", at(2024, 3, 2, 9)),
        ];

        let stats = compute_stats(&Period::monthly(date(2024, 3, 1)), &txs, &[]);
        assert_eq!(stats.savings, dec!(140));
        assert_eq!(stats.period_savings, dec!(40));
    }

    #[test]
    fn test_feed_is_anchor_day_newest_first() {
        let txs = vec![
            tx(1, TransactionType::Expense, dec!(5), "coffee", "Food", at(2024, 3, 5, 8)),
            tx(2, TransactionType::Expense, dec!(15), "lunch", "Food", at(2024, 3, 5, 12)),
            tx(3, TransactionType::Expense, dec!(50), "other day", "Food", at(2024, 3, 6, 12)),
            tx(4, TransactionType::Income, dec!(500), "Loan taken: Alice", "Loan", at(2024, 3, 5, 10)),
        ];
        let loans = vec![loan(
            dec!(500),
            vec![(LoanAction::Take, dec!(500), at(2024, 3, 5, 10))],
        )];

        let stats = compute_stats(&Period::monthly(date(2024, 3, 5)), &txs, &loans);
        let dates: Vec<_> = stats.feed.iter().map(|i| i.date()).collect();
        assert_eq!(dates, vec![at(2024, 3, 5, 12), at(2024, 3, 5, 10), at(2024, 3, 5, 8)]);
        assert!(matches!(stats.feed[1], ActivityItem::Loan(ref l) if l.name == "Alice"));
        // The mirror row does not show up next to its loan event
        assert_eq!(stats.feed.len(), 3);
        assert_eq!(stats.loan_balance, dec!(500));
    }

    #[test]
    fn test_daily_period_only_counts_anchor_day() {
        let txs = vec![
            tx(1, TransactionType::Income, dec!(10), "", "", at(2024, 3, 5, 8)),
            tx(2, TransactionType::Income, dec!(20), "", "", at(2024, 3, 4, 8)),
        ];
        let stats = compute_stats(&Period::daily(date(2024, 3, 5)), &txs, &[]);
        assert_eq!(stats.income, dec!(10));
    }

    #[test]
    fn test_check_savings() {
        assert!(check_savings(dec!(100), dec!(1000), dec!(0)).is_ok());
        assert!(check_savings(dec!(1000), dec!(1000), dec!(0)).is_ok());
        assert_eq!(
            check_savings(dec!(1001), dec!(1000), dec!(0)),
            Err(ValidationError::SavingsExceedBalance)
        );
        assert_eq!(
            check_savings(dec!(100), dec!(1000), dec!(1000)),
            Err(ValidationError::LoansOutstanding)
        );
        assert!(check_savings(dec!(100), dec!(1000), dec!(900)).is_ok());
        assert_eq!(
            check_savings(dec!(0), dec!(1000), dec!(0)),
            Err(ValidationError::NonPositiveAmount)
        );
    }

    #[test]
    fn test_chart_buckets_monthly_view_groups_by_month() {
        let txs = vec![
            tx(1, TransactionType::Income, dec!(10), "", "", at(2024, 3, 20, 8)),
            tx(2, TransactionType::Expense, dec!(4), "", "", at(2024, 3, 2, 8)),
            tx(3, TransactionType::Savings, dec!(3), "", "", at(2024, 3, 3, 8)),
        ];
        let buckets = chart_buckets(&Period::monthly(date(2024, 3, 1)), &txs);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].date, "2024-3");
        assert_eq!(buckets[0].income, dec!(10));
        assert_eq!(buckets[0].expenses, dec!(4));
        assert_eq!(buckets[0].savings, dec!(3));
    }

    #[test]
    fn test_chart_buckets_are_chronological() {
        let txs = vec![
            tx(1, TransactionType::Income, dec!(10), "", "", at(2024, 11, 20, 8)),
            tx(2, TransactionType::Income, dec!(4), "", "", at(2024, 2, 2, 8)),
            tx(3, TransactionType::Income, dec!(4), "Loan taken: Bob", "Loan", at(2024, 5, 2, 8)),
        ];
        let buckets = chart_buckets(&Period::yearly(date(2024, 1, 1)), &txs);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].date, "2024");
        assert_eq!(buckets[0].income, dec!(14));
    }

    #[test]
    fn test_category_breakdown_percentages() {
        let txs = vec![
            tx(1, TransactionType::Expense, dec!(30), "", "Food", at(2024, 3, 1, 8)),
            tx(2, TransactionType::Expense, dec!(60), "", "Rent", at(2024, 3, 2, 8)),
            tx(3, TransactionType::Expense, dec!(10), "", "Food", at(2024, 3, 3, 8)),
            tx(4, TransactionType::Expense, dec!(200), "", "Old", at(2023, 3, 3, 8)),
        ];
        let shares = category_breakdown(&Period::monthly(date(2024, 3, 1)), &txs, TransactionType::Expense);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].category, "Rent");
        assert_eq!(shares[0].percentage, dec!(60.0));
        assert_eq!(shares[1].amount, dec!(40));
        assert_eq!(shares[1].percentage, dec!(40.0));
    }

    #[test]
    fn test_percentage_guards_zero_total() {
        assert_eq!(percentage_of(dec!(5), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(percentage_of(dec!(1), dec!(3)), dec!(33.3));
    }

    #[test]
    fn test_percentage_saturates_instead_of_overflowing() {
        let tiny = Decimal::new(1, 22);
        assert_eq!(percentage_of(dec!(1000000000), tiny), Decimal::MAX);
        assert_eq!(percentage_of(dec!(-1000000000), tiny), Decimal::MIN);
    }

    #[test]
    fn test_totals_saturate_on_oversized_rows() {
        let txs = vec![
            tx(1, TransactionType::Income, Decimal::MAX, "", "Work", at(2024, 3, 1, 8)),
            tx(2, TransactionType::Income, Decimal::MAX, "", "Work", at(2024, 3, 2, 8)),
        ];
        let dashboard = Dashboard::build(Period::monthly(date(2024, 3, 1)), &txs, &[]);
        assert_eq!(dashboard.stats.income, Decimal::MAX);
        assert_eq!(dashboard.chart[0].income, Decimal::MAX);
        assert_eq!(dashboard.income_categories[0].percentage, dec!(100.0));
    }

    #[test]
    fn test_dashboard_build() {
        let txs = vec![tx(1, TransactionType::Income, dec!(10), "", "Work", at(2024, 3, 1, 8))];
        let dashboard = Dashboard::build(Period::daily(date(2024, 3, 1)), &txs, &[]);
        assert_eq!(dashboard.stats.balance, dec!(10));
        assert_eq!(dashboard.chart[0].date, "2024-03-01");
        assert_eq!(dashboard.income_categories[0].percentage, dec!(100.0));
        assert!(dashboard.expense_categories.is_empty());
    }
}
