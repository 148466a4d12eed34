/// Logger configuration derived from command-line flags
///
/// Recognized flags:
/// - `--debug-<tag>`   enable DEBUG output for one tag
/// - `--verbose`       enable everything down to VERBOSE
/// - `--verbose-<tag>` enable VERBOSE output for one tag
/// - `--quiet`         only errors
use super::levels::LogLevel;
use super::tags::LogTag;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::RwLock;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub min_level: LogLevel,
    pub debug_tags: HashSet<String>,
    pub verbose_tags: HashSet<String>,
    pub file_logging: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            verbose_tags: HashSet::new(),
            file_logging: true,
        }
    }
}

impl LoggerConfig {
    /// Build a configuration from an argument list
    pub fn from_args(args: &[String]) -> Self {
        let mut config = LoggerConfig::default();

        for arg in args {
            if arg == "--verbose" {
                config.min_level = LogLevel::Verbose;
            } else if arg == "--quiet" {
                config.min_level = LogLevel::Error;
            } else if arg == "--no-log-file" {
                config.file_logging = false;
            } else if let Some(tag) = arg.strip_prefix("--debug-") {
                config.debug_tags.insert(tag.to_lowercase());
            } else if let Some(tag) = arg.strip_prefix("--verbose-") {
                config.verbose_tags.insert(tag.to_lowercase());
            }
        }

        config
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

/// Snapshot of the current logger configuration
pub fn get_logger_config() -> LoggerConfig {
    match LOGGER_CONFIG.read() {
        Ok(config) => config.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}

pub fn set_logger_config(config: LoggerConfig) {
    match LOGGER_CONFIG.write() {
        Ok(mut guard) => *guard = config,
        Err(poisoned) => *poisoned.into_inner() = config,
    }
}

/// Configure the logger from the process arguments
pub fn init_from_args() {
    let args = crate::arguments::get_cmd_args();
    set_logger_config(LoggerConfig::from_args(&args));
}

pub(crate) fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    let config = get_logger_config();
    config.debug_tags.contains(&tag.to_debug_key()) || config.debug_tags.contains("all")
}

pub(crate) fn is_verbose_enabled_for_tag(tag: &LogTag) -> bool {
    get_logger_config().verbose_tags.contains(&tag.to_debug_key())
}
