use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use ratewatch::alerts::DecisionEngine;
use ratewatch::config::{load_config, with_config};
use ratewatch::database::{AverageWindow, HistoryDatabase};
use std::path::PathBuf;

/// Inspect the rate history database.
///
/// Prints the most recent samples, the current trailing average, whether the
/// latest sample would count as a spike, and the stored conversation state.
/// Opens the database read/write but only writes when --export is given
/// (and then only the JSON file).
#[derive(Parser, Debug)]
#[command(name = "tool_price_history", about = "Inspect stored USDT/BOB samples")]
struct Args {
    /// Number of recent samples to print
    #[arg(long, default_value_t = 20)]
    limit: usize,

    /// Write the full history as JSON to this path
    #[arg(long)]
    export: Option<PathBuf>,

    /// Database file (defaults to the configured one)
    #[arg(long)]
    db: Option<PathBuf>,

    /// Configuration file (defaults to <data>/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    load_config(args.config.as_deref()).map_err(anyhow::Error::msg)?;

    let db = match &args.db {
        Some(path) => {
            let (currency, exchange) =
                with_config(|c| (c.source.currency.clone(), c.source.exchange.clone()));
            HistoryDatabase::open(path, &currency, &exchange)
        }
        None => HistoryDatabase::open_from_config(),
    }
    .context("Failed to open rate history")?;

    let total = db.count_samples()?;
    println!("📊 {} samples stored ({} / {})", total, db.currency(), db.exchange());
    println!();

    let recent = db.get_recent_samples(args.limit)?;
    for sample in &recent {
        println!("  {}  {:>10.4}", sample.recorded_at, sample.amount);
    }
    if recent.is_empty() {
        println!("  (no samples)");
    }
    println!();

    let window = AverageWindow::from_config();
    let now = Local::now().naive_local();
    let average = db.weekly_average(&window, now)?;
    match average {
        Some(avg) => println!("📈 {}-day average: {:.4}", window.days, avg),
        None => println!("📈 {}-day average: no samples in window", window.days),
    }

    if let Some(latest) = recent.first() {
        let engine = DecisionEngine::from_config();
        match engine.spike_diff(latest.amount, average) {
            Some((_, diff)) => println!(
                "🚨 Latest sample is a spike: +{:.4} (threshold {:.2})",
                diff,
                engine.spike_threshold()
            ),
            None => println!("✓ Latest sample is within threshold {:.2}", engine.spike_threshold()),
        }
    }

    let state = db.get_conversation_state()?;
    let date = state
        .last_evaluated_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    let message = state
        .last_message_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("💬 Conversation state: date={} message={}", date, message);

    if let Some(path) = args.export {
        let count = db
            .export_samples_json(&path)
            .with_context(|| format!("Failed to export to {}", path.display()))?;
        println!();
        println!("📄 Exported {} samples to {}", count, path.display());
    }

    Ok(())
}
