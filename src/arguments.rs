/// Centralized argument handling for the ratewatch binary
///
/// The pipeline binary keeps the flag surface tiny and reads it through these
/// helpers; the logger scans the same list for --debug-<module> flags.
///
/// Flags:
/// - `--help`, `-h`        print usage and exit
/// - `--config <path>`     load configuration from an explicit TOML file
/// - `--dry-run`           decide and log, no Telegram call, no state write
/// - `--skip-publish`      skip git pull / JSON export / git push
/// - `--debug-<module>`    enable debug logs for one module
/// - `--verbose`, `--quiet`
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::sync::Mutex;

/// Global command-line arguments storage
pub static CMD_ARGS: Lazy<Mutex<Vec<String>>> = Lazy::new(|| Mutex::new(env::args().collect()));

/// Overrides the stored arguments (used by tools that build their own list)
pub fn set_cmd_args(args: Vec<String>) {
    if let Ok(mut cmd_args) = CMD_ARGS.lock() {
        *cmd_args = args;
    }
}

/// Gets a copy of the current command-line arguments
pub fn get_cmd_args() -> Vec<String> {
    match CMD_ARGS.lock() {
        Ok(args) => args.clone(),
        Err(_) => env::args().collect(),
    }
}

/// Checks if a specific argument is present in the command line
pub fn has_arg(arg: &str) -> bool {
    has_flag(&get_cmd_args(), arg)
}

/// Gets the value following a flag, e.g. `--config /etc/ratewatch.toml`
pub fn get_arg_value(flag: &str) -> Option<String> {
    flag_value(&get_cmd_args(), flag)
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .filter(|value| !value.starts_with("--"))
        .cloned()
}

pub fn is_dry_run_enabled() -> bool {
    has_arg("--dry-run")
}

pub fn is_skip_publish_enabled() -> bool {
    has_arg("--skip-publish")
}

pub fn get_config_path_override() -> Option<PathBuf> {
    get_arg_value("--config").map(PathBuf::from)
}

pub mod patterns {
    use super::has_arg;

    pub fn is_help_requested() -> bool {
        has_arg("--help") || has_arg("-h")
    }
}

pub fn print_help() {
    println!("ratewatch - sample the USDT/BOB rate, store it and notify Telegram");
    println!();
    println!("USAGE:");
    println!("    ratewatch [FLAGS]");
    println!();
    println!("FLAGS:");
    println!("    -h, --help            Print this help");
    println!("    --config <path>       Configuration file (default: <data>/config.toml)");
    println!("    --dry-run             Decide and log only; no Telegram call, no state write");
    println!("    --skip-publish        Skip the git pull / JSON export / git push steps");
    println!("    --debug-<module>      Debug logs for: system, config, api, database,");
    println!("                          alerts, telegram, publish (or 'all')");
    println!("    --verbose             Most detailed output");
    println!("    --quiet               Errors only");
    println!("    --no-log-file         Console output only");
    println!();
    println!("Run it from cron; overlapping runs are refused through a lock file.");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_flag_lookup() {
        let list = args(&["ratewatch", "--dry-run", "--config", "/tmp/c.toml"]);
        assert!(has_flag(&list, "--dry-run"));
        assert!(!has_flag(&list, "--skip-publish"));
        assert_eq!(flag_value(&list, "--config"), Some("/tmp/c.toml".to_string()));
    }

    #[test]
    fn test_flag_value_missing_or_followed_by_flag() {
        assert_eq!(flag_value(&args(&["ratewatch", "--config"]), "--config"), None);
        assert_eq!(
            flag_value(&args(&["ratewatch", "--config", "--dry-run"]), "--config"),
            None
        );
    }
}
