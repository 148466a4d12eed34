//! Special console output for the pipeline run: banner, step headers,
//! highlighted price box and the final status line.
//!
//! These bypass level filtering (they are the run's progress report) but are
//! still mirrored into the log file.

use super::file::write_to_file;
use chrono::Local;
use colored::*;

const RULE_WIDTH: usize = 72;

fn rule() -> String {
    "─".repeat(RULE_WIDTH)
}

/// Print the startup banner
pub fn log_banner(pair: &str, source: &str) {
    let now = Local::now().format("%d/%m/%Y %H:%M:%S");
    println!();
    println!("  {}", "RATEWATCH".bright_cyan().bold());
    println!(
        "  {} {}",
        pair.magenta(),
        format!("· {} · {}", source, now).dimmed()
    );
    println!("  {}", rule().dimmed());

    write_to_file(&format!("==== ratewatch run {} ({} · {}) ====", now, pair, source));
}

/// Print a numbered step header, e.g. `[3/8] 💾 Saving sample...`
pub fn log_step(step: usize, total: usize, icon: &str, message: &str) {
    println!();
    println!(
        "  {} {} {}",
        format!("[{}/{}]", step, total).bright_blue().bold(),
        icon,
        message
    );
    write_to_file(&format!("[STEP {}/{}] {}", step, total, message));
}

/// Print the fetched price in a highlighted box
pub fn log_price_box(price: f64, base: &str, quote: &str) {
    let line = format!("  1 {} = {:.4} {}  ", base, price, quote);
    let border = "━".repeat(line.chars().count());

    println!();
    println!("        {}", format!("┏{}┓", border).cyan().bold());
    println!(
        "        {}{}{}",
        "┃".cyan().bold(),
        line.white().bold(),
        "┃".cyan().bold()
    );
    println!("        {}", format!("┗{}┛", border).cyan().bold());
    println!();

    write_to_file(&format!("price: 1 {} = {:.4} {}", base, price, quote));
}

/// Print the final success line
pub fn log_done(message: &str) {
    println!();
    println!("  {}", rule().dimmed());
    println!("  {}", format!("✓ {}", message).green().bold());
    println!();
    write_to_file(&format!("DONE: {}", message));
}

/// Print a fatal error line (the caller decides the exit code)
pub fn log_fatal(message: &str) {
    println!();
    println!("  {}", format!("✗ FATAL: {}", message).red().bold());
    println!();
    write_to_file(&format!("FATAL: {}", message));
}
