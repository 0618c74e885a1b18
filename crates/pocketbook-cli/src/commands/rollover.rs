//! Rollover command implementation

use anyhow::Result;
use pocketbook_core::{Database, Ledger, RolloverJob, RolloverOutcome};

use super::format_amount;

pub fn cmd_rollover(db: &Database, user_id: Option<&str>) -> Result<()> {
    let job = RolloverJob::default();

    let Some(user_id) = user_id else {
        let rolled = pocketbook_server::run_rollover_for_all(db, &job)?;
        println!("🗓️  Month-end rollover recorded savings for {} user(s)", rolled);
        return Ok(());
    };

    match job.run(&Ledger::for_user(db, user_id))? {
        RolloverOutcome::Rolled { transaction } => println!(
            "✅ Moved {} into savings ({})",
            format_amount(transaction.savings),
            transaction.date.format("%Y-%m-%d")
        ),
        RolloverOutcome::NotMonthEnd => println!("Not the last day of the month; nothing to do."),
        RolloverOutcome::NoPositiveBalance => println!("No positive balance today; nothing to save."),
        RolloverOutcome::AlreadyRolledOver => println!("Already rolled over this month."),
    }

    Ok(())
}
