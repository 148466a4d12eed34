/// Configuration utilities - loading, environment overrides and access helpers
use super::schemas::Config;
use crate::logger::{self, LogTag};
use once_cell::sync::OnceCell;
use std::path::Path;
use std::sync::RwLock;

/// Global configuration instance
///
/// Single source of truth for configuration values; read it with
/// [`with_config`]. Until a file is loaded it holds the defaults.
pub static CONFIG: OnceCell<RwLock<Config>> = OnceCell::new();

/// Environment variables that override file values
pub const ENV_BOT_TOKEN: &str = "TELEGRAM_BOT_TOKEN";
pub const ENV_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

/// Upper bound for `alerts.average_window_days`
pub const MAX_AVERAGE_WINDOW_DAYS: i64 = 3_650;

/// Upper bound for `database.retention_days`
pub const MAX_RETENTION_DAYS: i64 = 36_500;

fn config_lock() -> &'static RwLock<Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::default()))
}

/// Load `.env`, the TOML file and environment overrides into the global CONFIG
///
/// `path` falls back to `<data>/config.toml`. A missing file is not an error:
/// defaults are used and a warning is logged.
pub fn load_config(path: Option<&Path>) -> Result<(), String> {
    if dotenv::dotenv().is_err() {
        logger::debug(LogTag::Config, ".env not found, using process environment only");
    }

    let default_path = crate::paths::get_config_path();
    let path = path.unwrap_or(default_path.as_path());

    let mut config = read_config_file(path)?;
    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config)
        .map_err(|e| format!("Invalid configuration in '{}': {}", path.display(), e))?;

    set_config(config);
    Ok(())
}

/// Read and parse a TOML config file; defaults if the file doesn't exist
pub fn read_config_file(path: &Path) -> Result<Config, String> {
    if !path.exists() {
        logger::warning(
            LogTag::Config,
            &format!("Config file '{}' not found, using default values", path.display()),
        );
        return Ok(Config::default());
    }

    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config file '{}': {}", path.display(), e))?;

    parse_config(&contents)
        .map_err(|e| format!("Failed to parse config file '{}': {}", path.display(), e))
}

pub fn parse_config(contents: &str) -> Result<Config, String> {
    toml::from_str::<Config>(contents).map_err(|e| e.to_string())
}

/// Reject values the pipeline cannot work with
pub fn validate_config(config: &Config) -> Result<(), String> {
    let alerts = &config.alerts;
    if !alerts.spike_threshold.is_finite() || alerts.spike_threshold < 0.0 {
        return Err(format!(
            "alerts.spike_threshold must be a non-negative number, got {}",
            alerts.spike_threshold
        ));
    }
    if !(1..=MAX_AVERAGE_WINDOW_DAYS).contains(&alerts.average_window_days) {
        return Err(format!(
            "alerts.average_window_days must be between 1 and {}, got {}",
            MAX_AVERAGE_WINDOW_DAYS, alerts.average_window_days
        ));
    }
    if !(0..=MAX_RETENTION_DAYS).contains(&config.database.retention_days) {
        return Err(format!(
            "database.retention_days must be between 0 and {}, got {}",
            MAX_RETENTION_DAYS, config.database.retention_days
        ));
    }
    Ok(())
}

/// Apply TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID over the file values
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(token) = lookup(ENV_BOT_TOKEN).filter(|v| !v.trim().is_empty()) {
        config.telegram.bot_token = token.trim().to_string();
    }
    if let Some(chat_id) = lookup(ENV_CHAT_ID).filter(|v| !v.trim().is_empty()) {
        config.telegram.chat_id = chat_id.trim().to_string();
    }
}

/// Replace the global configuration
pub fn set_config(config: Config) {
    match config_lock().write() {
        Ok(mut guard) => *guard = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// Execute a function with read access to the configuration
///
/// # Example
/// ```ignore
/// let threshold = with_config(|cfg| cfg.alerts.spike_threshold);
/// ```
pub fn with_config<F, R>(f: F) -> R
where
    F: FnOnce(&Config) -> R,
{
    match config_lock().read() {
        Ok(config) => f(&config),
        Err(poisoned) => f(&poisoned.into_inner()),
    }
}
