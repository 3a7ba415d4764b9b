mod config;
mod error;
mod fetcher;
mod ledger;
mod parser;
mod tracker;

use std::time::Instant;

use clap::Parser;
use tracing::{info, warn};

use crate::config::Settings;
use crate::fetcher::HttpTransport;
use crate::ledger::Ledger;
use crate::tracker::Tracker;

/// Fetches the Oikotie and Lumo rental search pages once and records today's
/// listing counts in the ledger CSV. Settings come from `LISTINGS_*` env vars.
#[derive(Parser)]
#[command(name = "listing_tracker", version, about)]
struct Cli {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let _cli = Cli::parse();
    let t0 = Instant::now();

    let settings = Settings::load()?;
    info!(ledger = %settings.ledger_path.display(), "Starting listing count run");

    let transport = HttpTransport::new(&settings)?;
    let today = chrono::Local::now().date_naive();
    let (record, outcome) = Tracker::new(&transport, &settings).run_once(today).await?;

    println!(
        "{}: Oikotie={}, Lumo={}",
        record.date.format("%Y-%m-%d"),
        record.oikotie,
        record.lumo
    );
    match Ledger::new(&settings.ledger_path).records() {
        Ok(rows) => info!(?outcome, days = rows.len(), "Ledger updated"),
        Err(e) => warn!("Ledger written but could not be read back: {:#}", e),
    }
    info!("Done in {:.1}s", t0.elapsed().as_secs_f64());
    Ok(())
}
