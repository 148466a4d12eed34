/// Daily log file persistence
///
/// One file per day under `logs/`: `ratewatch_YYYY-MM-DD.log`, opened in
/// append mode so every cron run adds to the same file.
use chrono::Local;
use once_cell::sync::Lazy;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::sync::Mutex;

static LOG_FILE: Lazy<Mutex<Option<BufWriter<File>>>> = Lazy::new(|| Mutex::new(None));

/// Open today's log file (no-op if file logging is disabled)
pub fn init_file_logging() {
    if !super::config::get_logger_config().file_logging {
        return;
    }

    let path = crate::paths::get_logs_directory().join(format!(
        "ratewatch_{}.log",
        Local::now().format("%Y-%m-%d")
    ));

    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            if let Ok(mut guard) = LOG_FILE.lock() {
                *guard = Some(BufWriter::new(file));
            }
        }
        Err(e) => {
            eprintln!("⚠️  Failed to open log file {}: {}", path.display(), e);
        }
    }
}

/// Append a line to the log file if one is open
pub fn write_to_file(line: &str) {
    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(writer) = guard.as_mut() {
            let _ = writeln!(writer, "{}", line);
        }
    }
}

pub fn flush_file_logging() {
    if let Ok(mut guard) = LOG_FILE.lock() {
        if let Some(writer) = guard.as_mut() {
            let _ = writer.flush();
        }
    }
}
