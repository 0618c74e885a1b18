//! Goal command implementations

use anyhow::Result;
use chrono::Utc;
use pocketbook_core::goals::{completed_count, default_target, display_percentage, parse_target};
use pocketbook_core::models::{GoalStatus, GoalType, NewGoal};
use pocketbook_core::{Database, GoalView, Ledger};
use rust_decimal::Decimal;

use super::{format_amount, today, truncate};

pub fn cmd_goals_list(
    db: &Database,
    user_id: &str,
    kind: Option<GoalType>,
    selector: Option<&str>,
) -> Result<()> {
    let ledger = Ledger::for_user(db, user_id);

    let views = match kind {
        Some(kind) => {
            let selected = match selector {
                Some(s) => parse_target(kind, s)?,
                None => today(),
            };
            ledger.goal_views(kind, selected)?
        }
        None => {
            let transactions = ledger.transactions()?;
            ledger
                .goals()?
                .into_iter()
                .map(|g| GoalView::new(g, &transactions))
                .collect()
        }
    };

    if views.is_empty() {
        println!("No goals.");
        return Ok(());
    }

    let goals: Vec<_> = views.iter().map(|v| v.goal.clone()).collect();

    println!();
    println!(
        "🎯 Goals ({} of {} completed)",
        completed_count(&goals),
        goals.len()
    );
    println!("   ─────────────────────────────────────────────────────────────");

    for view in &views {
        let goal = &view.goal;
        let mark = if goal.status == GoalStatus::Completed {
            "✔"
        } else {
            " "
        };
        println!(
            "   [{}] {} P{} {:<7} {:<24} {:>10} by {} │ {:>5}% │ {} to go",
            goal.id,
            mark,
            goal.priority,
            goal.kind.as_str(),
            truncate(&goal.description, 24),
            format_amount(goal.amount),
            goal.target_date,
            display_percentage(&view.progress),
            format_amount(view.progress.remaining)
        );
    }

    Ok(())
}

pub fn cmd_goals_add(
    db: &Database,
    user_id: &str,
    kind: GoalType,
    amount: Decimal,
    description: &str,
    target: Option<&str>,
    priority: i64,
) -> Result<()> {
    let now = Utc::now();
    let target_date = match target {
        Some(s) => parse_target(kind, s)?,
        None => default_target(kind, now.date_naive()),
    };

    let goal = Ledger::for_user(db, user_id).add_goal(
        &NewGoal {
            kind,
            amount,
            description: description.trim().to_string(),
            target_date,
            priority,
        },
        now,
    )?;

    println!(
        "✅ Added {} goal {} of {} by {}",
        goal.kind,
        goal.id,
        format_amount(goal.amount),
        goal.target_date
    );
    Ok(())
}

pub fn cmd_goals_toggle(db: &Database, user_id: &str, id: i64) -> Result<()> {
    let goal = Ledger::for_user(db, user_id).toggle_goal(id)?;
    println!("✅ Goal {} is now {}", goal.id, goal.status.as_str());
    Ok(())
}
