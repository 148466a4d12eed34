//! Centralized path resolution for RateWatch
//!
//! All file and directory paths are resolved through this module so cron runs,
//! manual runs and the inspection tool agree on where data lives.
//!
//! ## Path Strategy
//!
//! `RATEWATCH_HOME` wins when set; otherwise the platform data directory:
//! - **macOS**: `~/Library/Application Support/RateWatch/`
//! - **Windows**: `%LOCALAPPDATA%\RateWatch\`
//! - **Linux**: `$XDG_DATA_HOME/RateWatch/` (fallback `~/.local/share/RateWatch/`)
//!
//! ## Directory Structure
//!
//! ```text
//! RateWatch/
//! ├── data/
//! │   ├── config.toml
//! │   ├── rates.db
//! │   └── .ratewatch.lock
//! └── logs/
//!     └── ratewatch_*.log
//! ```

use once_cell::sync::Lazy;
use std::path::PathBuf;

const APP_DIR: &str = "RateWatch";

static BASE_DIRECTORY: Lazy<PathBuf> = Lazy::new(resolve_base_directory);

fn resolve_base_directory() -> PathBuf {
    if let Ok(home) = std::env::var("RATEWATCH_HOME") {
        if !home.trim().is_empty() {
            return PathBuf::from(home);
        }
    }

    if let Some(dir) = dirs::data_local_dir() {
        return dir.join(APP_DIR);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(APP_DIR);
    }

    PathBuf::from(APP_DIR)
}

/// Returns the base directory for all RateWatch data
pub fn get_base_directory() -> PathBuf {
    BASE_DIRECTORY.clone()
}

/// Databases, config and the lock file
pub fn get_data_directory() -> PathBuf {
    BASE_DIRECTORY.join("data")
}

pub fn get_logs_directory() -> PathBuf {
    BASE_DIRECTORY.join("logs")
}

pub fn get_config_path() -> PathBuf {
    get_data_directory().join("config.toml")
}

/// Default rate history database (overridable via `database.path`)
pub fn get_rates_db_path() -> PathBuf {
    get_data_directory().join("rates.db")
}

pub fn get_lock_file_path() -> PathBuf {
    get_data_directory().join(".ratewatch.lock")
}

/// Create every directory the binary writes into
pub fn ensure_all_directories() -> Result<(), String> {
    for dir in [get_data_directory(), get_logs_directory()] {
        std::fs::create_dir_all(&dir)
            .map_err(|e| format!("Failed to create directory {}: {}", dir.display(), e))?;
    }
    Ok(())
}
