//! Goal tracker
//!
//! Progress is never stored: it is derived from savings transactions each
//! time a goal is shown.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::ValidationError;
use crate::models::{
    Goal, GoalProgress, GoalStatus, GoalType, NewGoal, Transaction, TransactionType, MAX_AMOUNT,
};
use crate::period::{first_day_of_month, Period, ViewPeriod};
use crate::stats::percentage_of;

/// Savings recorded on or before the goal's target date
pub fn total_saved_by(target_date: NaiveDate, transactions: &[Transaction]) -> Decimal {
    transactions
        .iter()
        .filter(|t| t.kind == TransactionType::Savings && t.date.date_naive() <= target_date)
        .fold(Decimal::ZERO, |acc, t| acc.saturating_add(t.savings))
}

/// Live progress of a goal. The percentage is not clamped and is 0 for a
/// zero goal amount.
pub fn progress(goal: &Goal, transactions: &[Transaction]) -> GoalProgress {
    let total_saved = total_saved_by(goal.target_date, transactions);
    GoalProgress {
        goal_id: goal.id,
        total_saved,
        progress_percentage: percentage_of(total_saved, goal.amount),
        remaining: goal.amount.saturating_sub(total_saved),
    }
}

/// Percentage bounded to 0..=100 for progress bars
pub fn display_percentage(progress: &GoalProgress) -> Decimal {
    progress
        .progress_percentage
        .clamp(Decimal::ZERO, Decimal::ONE_HUNDRED)
}

/// Parse a goal target selector: `YYYY-MM` for monthly goals (first of the
/// month), `YYYY` for yearly goals (January 1st). A full date is accepted too.
pub fn parse_target(kind: GoalType, selector: &str) -> std::result::Result<NaiveDate, ValidationError> {
    let view = match kind {
        GoalType::Monthly => ViewPeriod::Monthly,
        GoalType::Yearly => ViewPeriod::Yearly,
    };
    Period::from_selector(view, selector)
        .map(|p| p.anchor)
        .map_err(|_| ValidationError::InvalidGoal(format!("bad target date '{}'", selector)))
}

/// Default target when the user does not pick one: next month or next year
pub fn default_target(kind: GoalType, today: NaiveDate) -> NaiveDate {
    match kind {
        GoalType::Monthly => {
            let (year, month) = if today.month() == 12 {
                (today.year() + 1, 1)
            } else {
                (today.year(), today.month() + 1)
            };
            NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(first_day_of_month(today))
        }
        GoalType::Yearly => NaiveDate::from_ymd_opt(today.year() + 1, 1, 1).unwrap_or(today),
    }
}

pub fn validate(goal: &NewGoal) -> std::result::Result<(), ValidationError> {
    if goal.amount <= Decimal::ZERO {
        return Err(ValidationError::InvalidGoal(
            "amount must be greater than zero".to_string(),
        ));
    }
    if goal.amount > MAX_AMOUNT {
        return Err(ValidationError::InvalidGoal(format!(
            "amount cannot exceed {}",
            MAX_AMOUNT
        )));
    }
    if goal.priority < 1 {
        return Err(ValidationError::InvalidGoal(
            "priority must be 1 or higher".to_string(),
        ));
    }
    Ok(())
}

/// Goals of one type created in the selected month (monthly) or year
/// (yearly), highest priority first
pub fn goals_for_view(goals: &[Goal], kind: GoalType, selected: NaiveDate) -> Vec<Goal> {
    let mut selected_goals: Vec<Goal> = goals
        .iter()
        .filter(|g| g.kind == kind)
        .filter(|g| {
            let created = g.goal_created.date_naive();
            match kind {
                GoalType::Monthly => {
                    created.year() == selected.year() && created.month() == selected.month()
                }
                GoalType::Yearly => created.year() == selected.year(),
            }
        })
        .cloned()
        .collect();
    selected_goals.sort_by_key(|g| g.priority);
    selected_goals
}

pub fn completed_count(goals: &[Goal]) -> usize {
    goals
        .iter()
        .filter(|g| g.status == GoalStatus::Completed)
        .count()
}

/// A goal together with its live progress
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GoalView {
    #[serde(flatten)]
    pub goal: Goal,
    pub progress: GoalProgress,
}

impl GoalView {
    pub fn new(goal: Goal, transactions: &[Transaction]) -> Self {
        let progress = progress(&goal, transactions);
        Self { goal, progress }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 0, 0).unwrap()
    }

    fn saving(amount: Decimal, when: DateTime<Utc>) -> Transaction {
        Transaction {
            id: 0,
            user_id: "u1".to_string(),
            kind: TransactionType::Savings,
            amount,
            savings: amount,
            description: String::new(),
            category: String::new(),
            date: when,
            created_at: when,
        }
    }

    fn goal(kind: GoalType, amount: Decimal, priority: i64, created: DateTime<Utc>) -> Goal {
        Goal {
            id: priority,
            user_id: "u1".to_string(),
            kind,
            amount,
            description: String::new(),
            target_date: date(2024, 6, 1),
            priority,
            goal_created: created,
            status: GoalStatus::Pending,
            is_reached: false,
        }
    }

    #[test]
    fn test_progress_quarter_of_goal() {
        let g = goal(GoalType::Monthly, dec!(1000), 1, at(2024, 3, 1));
        let txs = vec![saving(dec!(150), at(2024, 3, 2)), saving(dec!(100), at(2024, 6, 1))];

        let p = progress(&g, &txs);
        assert_eq!(p.total_saved, dec!(250));
        assert_eq!(p.progress_percentage, dec!(25.0));
        assert_eq!(p.remaining, dec!(750));
    }

    #[test]
    fn test_progress_ignores_savings_after_target() {
        let g = goal(GoalType::Monthly, dec!(100), 1, at(2024, 3, 1));
        let txs = vec![saving(dec!(50), at(2024, 6, 2))];
        assert_eq!(progress(&g, &txs).total_saved, Decimal::ZERO);
    }

    #[test]
    fn test_progress_is_unclamped() {
        let g = goal(GoalType::Monthly, dec!(100), 1, at(2024, 3, 1));
        let txs = vec![saving(dec!(150), at(2024, 3, 2))];

        let p = progress(&g, &txs);
        assert_eq!(p.progress_percentage, dec!(150.0));
        assert_eq!(p.remaining, dec!(-50));
        assert_eq!(display_percentage(&p), dec!(100));
    }

    #[test]
    fn test_progress_non_decreasing_as_savings_arrive() {
        let g = goal(GoalType::Yearly, dec!(300), 1, at(2024, 1, 1));
        let mut txs = Vec::new();
        let mut last = Decimal::ZERO;
        for day in 1..=5 {
            txs.push(saving(dec!(40), at(2024, 2, day)));
            let current = progress(&g, &txs).progress_percentage;
            assert!(current >= last);
            last = current;
        }
    }

    #[test]
    fn test_parse_target() {
        assert_eq!(parse_target(GoalType::Monthly, "2024-07").unwrap(), date(2024, 7, 1));
        assert_eq!(parse_target(GoalType::Yearly, "2025").unwrap(), date(2025, 1, 1));
        assert!(parse_target(GoalType::Monthly, "July").is_err());
    }

    #[test]
    fn test_default_target() {
        assert_eq!(default_target(GoalType::Monthly, date(2024, 12, 15)), date(2025, 1, 1));
        assert_eq!(default_target(GoalType::Monthly, date(2024, 3, 31)), date(2024, 4, 1));
        assert_eq!(default_target(GoalType::Yearly, date(2024, 3, 31)), date(2025, 1, 1));
    }

    #[test]
    fn test_validate_rejects_non_positive_amount() {
        let new_goal = NewGoal {
            kind: GoalType::Monthly,
            amount: dec!(0),
            description: String::new(),
            target_date: date(2024, 7, 1),
            priority: 1,
        };
        assert!(validate(&new_goal).is_err());
        assert!(validate(&NewGoal { amount: dec!(10), ..new_goal.clone() }).is_ok());
        assert!(validate(&NewGoal { amount: dec!(10), priority: 0, ..new_goal }).is_err());
    }

    #[test]
    fn test_validate_caps_amount() {
        let new_goal = NewGoal {
            kind: GoalType::Yearly,
            amount: MAX_AMOUNT,
            description: String::new(),
            target_date: date(2025, 1, 1),
            priority: 1,
        };
        assert!(validate(&new_goal).is_ok());
        assert!(validate(&NewGoal { amount: MAX_AMOUNT + dec!(0.01), ..new_goal }).is_err());
    }

    #[test]
    fn test_progress_on_tiny_goal_does_not_overflow() {
        let g = goal(GoalType::Monthly, Decimal::new(1, 22), 1, at(2024, 3, 1));
        let txs = vec![saving(dec!(1000000000), at(2024, 3, 2))];

        let p = progress(&g, &txs);
        assert_eq!(p.progress_percentage, Decimal::MAX);
        assert_eq!(display_percentage(&p), dec!(100));
    }

    #[test]
    fn test_goals_for_view_filters_and_sorts() {
        let goals = vec![
            goal(GoalType::Monthly, dec!(10), 3, at(2024, 3, 1)),
            goal(GoalType::Monthly, dec!(10), 1, at(2024, 3, 20)),
            goal(GoalType::Monthly, dec!(10), 2, at(2024, 4, 1)),
            goal(GoalType::Monthly, dec!(10), 4, at(2023, 3, 1)),
            goal(GoalType::Yearly, dec!(10), 5, at(2024, 3, 1)),
        ];

        let monthly = goals_for_view(&goals, GoalType::Monthly, date(2024, 3, 1));
        let priorities: Vec<i64> = monthly.iter().map(|g| g.priority).collect();
        assert_eq!(priorities, vec![1, 3]);

        let yearly = goals_for_view(&goals, GoalType::Yearly, date(2024, 1, 1));
        assert_eq!(yearly.len(), 1);
    }

    #[test]
    fn test_completed_count() {
        let mut goals = vec![
            goal(GoalType::Monthly, dec!(10), 1, at(2024, 3, 1)),
            goal(GoalType::Yearly, dec!(10), 2, at(2024, 3, 1)),
        ];
        goals[1].status = GoalStatus::Completed;
        assert_eq!(completed_count(&goals), 1);
    }
}
