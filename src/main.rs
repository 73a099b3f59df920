//! Squadboard demo binary.
//!
//! Wires one cache, one API client, and one data service at startup, then
//! prints the dashboard summary and a cache snapshot. Run it twice within
//! a TTL against a live data store to see the second run served from
//! memory.

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use squadboard::api::ApiClient;
use squadboard::cache::Cache;
use squadboard::config::Config;
use squadboard::service::DataService;

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();
    info!("Squadboard starting");

    let config = Config::load()?;
    let mut api = ApiClient::new(config.base_url())?;
    if let Some(key) = config.api_key.clone() {
        api = api.with_key(key);
    }

    let cache = Cache::new();
    let service = DataService::new(cache.clone(), api);

    let summary = service.dashboard_summary().await?;
    println!("Teams:          {}", summary.team_count);
    println!(
        "Members:        {} ({} players)",
        summary.member_count, summary.player_count
    );
    println!(
        "Matches:        {} ({}W / {}L / {}D, {:.1}% wins)",
        summary.matches_played, summary.wins, summary.losses, summary.draws, summary.win_pct
    );
    println!(
        "Expenses:       {:.2}",
        summary.total_expenses_cents as f64 / 100.0
    );

    let stats = cache.stats();
    println!(
        "Cache:          {} entries, {} fetches in flight",
        stats.total_entries, stats.pending_requests
    );

    info!("Squadboard done");
    Ok(())
}
