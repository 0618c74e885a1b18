//! Server command implementation

use std::path::Path;

use anyhow::Result;
use pocketbook_server::{parse_api_keys, RolloverScheduleConfig, API_KEYS_ENV};

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_auth: bool,
    no_encrypt: bool,
) -> Result<()> {
    println!("🚀 Starting Pocketbook web server...");
    println!("   Database: {}", db_path.display());
    println!("   Listening: http://{}:{}", host, port);

    let api_keys = parse_api_keys(&std::env::var(API_KEYS_ENV).unwrap_or_default());

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else if api_keys.is_empty() {
        println!("   🔒 Authentication: API key (none configured, set {})", API_KEYS_ENV);
    } else {
        println!(
            "   🔑 API keys: {} configured ({})",
            api_keys.len(),
            API_KEYS_ENV
        );
    }
    match RolloverScheduleConfig::from_env() {
        Some(schedule) => println!(
            "   🗓️  Month-end rollover: every {} minute(s)",
            schedule.interval_minutes
        ),
        None => println!("   🗓️  Month-end rollover: manual (set POCKETBOOK_ROLLOVER_SCHEDULE)"),
    }
    if no_encrypt {
        println!("   ⚠️  Encryption DISABLED (--no-encrypt)");
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let db = open_db(db_path, no_encrypt)?;

    let config = pocketbook_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins: vec![],
        api_keys,
    };

    pocketbook_server::serve_with_config(db, host, port, config).await?;

    Ok(())
}
