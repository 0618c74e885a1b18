//! Pocketbook CLI - Personal finance ledger
//!
//! Usage:
//!   pocketbook init                               Initialize database
//!   pocketbook signup --email E --password P      Create an account
//!   pocketbook add --user ID --type income 100    Record an entry
//!   pocketbook stats --user ID --period monthly   Show period stats
//!   pocketbook serve --port 3000                  Start web server

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use pocketbook_core::LocalObjectStore;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Serve {
            port,
            host,
            no_auth,
        } => commands::cmd_serve(&cli.db, &host, port, no_auth, cli.no_encrypt).await,
        Commands::Signup {
            email,
            name,
            password,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_signup(&db, &email, &name, &password).map(|_| ())
        }
        Commands::Add {
            user,
            kind,
            amount,
            description,
            category,
            date,
            time,
            period,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_add(
                &db,
                &user,
                &commands::AddEntry {
                    kind,
                    amount,
                    description: &description,
                    category: &category,
                    date,
                    time,
                    period,
                },
            )
        }
        Commands::Loan { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                LoanCommand::Take {
                    user,
                    amount,
                    name,
                    loan_id,
                    note,
                    date,
                } => commands::cmd_loan_take(
                    &db,
                    &user,
                    amount,
                    name.as_deref(),
                    loan_id,
                    &note,
                    date,
                ),
                LoanCommand::Clear {
                    user,
                    loan_id,
                    amount,
                    note,
                    date,
                } => commands::cmd_loan_clear(&db, &user, loan_id, amount, &note, date),
            }
        }
        Commands::Transactions { user, limit, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_transactions_list(&db, &user, limit, json)
        }
        Commands::Loans { user, active } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_loans_list(&db, &user, active)
        }
        Commands::Stats {
            user,
            period,
            date,
            json,
        } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let period = commands::resolve_period(period, date.as_deref())?;
            commands::cmd_stats(&db, &user, period, json)
        }
        Commands::Goals { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                GoalsCommand::List { user, kind, date } => {
                    commands::cmd_goals_list(&db, &user, kind, date.as_deref())
                }
                GoalsCommand::Add {
                    user,
                    kind,
                    amount,
                    description,
                    target,
                    priority,
                } => commands::cmd_goals_add(
                    &db,
                    &user,
                    kind,
                    amount,
                    &description,
                    target.as_deref(),
                    priority,
                ),
                GoalsCommand::Toggle { user, id } => commands::cmd_goals_toggle(&db, &user, id),
            }
        }
        Commands::Rollover { user } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_rollover(&db, user.as_deref())
        }
        Commands::DeleteAccount { user, password } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            let store = LocalObjectStore::from_env()?;
            commands::cmd_delete_account(&db, &store, &user, &password)
        }
    }
}
