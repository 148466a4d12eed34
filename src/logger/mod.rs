//! Structured tagged logging for RateWatch
//!
//! This module provides a small, ergonomic logging API with:
//! - Standard log levels (Error/Warning/Info/Debug/Verbose)
//! - Per-module debug control via --debug-<module> flags
//! - Dual output: colored console + daily log file
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ratewatch::logger::{self, LogTag};
//!
//! logger::error(LogTag::Api, "Connection failed");
//! logger::warning(LogTag::Database, "Weekly average unavailable");
//! logger::info(LogTag::Alerts, "Decision: edit message 42");
//! logger::debug(LogTag::Telegram, "Payload: ..."); // Only with --debug-telegram
//! ```
//!
//! ## Initialization
//!
//! Call once at startup, after `paths::ensure_all_directories()`:
//! ```rust,ignore
//! logger::init();
//! ```
//!
//! Logging before `init()` still works; it falls back to console-only output
//! with the default configuration (useful in tests).

mod config;
mod core;
mod file;
mod format;
mod levels;
mod special;
mod tags;

pub use config::{get_logger_config, init_from_args, set_logger_config, LoggerConfig};
pub use levels::LogLevel;
pub use special::{log_banner, log_done, log_fatal, log_price_box, log_step};
pub use tags::LogTag;

/// Initialize the logger system
///
/// Parses command-line arguments for debug flags and opens today's log file.
pub fn init() {
    config::init_from_args();
    file::init_file_logging();
}

/// Log at ERROR level (always shown)
pub fn error(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Error, message);
}

/// Log at WARNING level
///
/// Warnings are shown unless --quiet is used.
pub fn warning(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Warning, message);
}

/// Log at INFO level (standard operations)
pub fn info(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Info, message);
}

/// Log at DEBUG level
///
/// Only shown when --debug-<module> is provided for the tag.
///
/// # Example
/// ```rust,ignore
/// // Only shown with --debug-database
/// logger::debug(LogTag::Database, "Inserted sample id=17");
/// ```
pub fn debug(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Debug, message);
}

/// Log at VERBOSE level (only with --verbose or --verbose-<module>)
pub fn verbose(tag: LogTag, message: &str) {
    core::log_internal(tag, LogLevel::Verbose, message);
}

/// Force flush all pending log writes
///
/// Call this before exiting so the log file is complete.
pub fn flush() {
    file::flush_file_logging();
}
