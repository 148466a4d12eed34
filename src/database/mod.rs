// Rate history database (SQLite)
//
// Two tables: append-only `price_samples` and the singleton
// `conversation_state` row used by the decision engine.

mod conversation;
mod history;
mod models;

pub use models::{AverageWindow, PriceSample, DATE_FORMAT, TIMESTAMP_FORMAT};

use crate::errors::{PipelineError, PipelineResult};
use crate::logger::{self, LogTag};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

/// Cheap to clone; clones share the connection
#[derive(Clone)]
pub struct HistoryDatabase {
    conn: Arc<Mutex<Connection>>,
    currency: String,
    exchange: String,
}

impl HistoryDatabase {
    /// Open (or create) the database file and its tables
    pub fn open<P: AsRef<Path>>(path: P, currency: &str, exchange: &str) -> PipelineResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            PipelineError::Storage(format!("Failed to open database {}: {}", path.display(), e))
        })?;

        // WAL keeps the inspection tool from blocking a running pipeline
        conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get::<_, String>(0))
            .map_err(|e| PipelineError::Storage(format!("Failed to enable WAL mode: {}", e)))?;

        logger::debug(
            LogTag::Database,
            &format!("Opened rate history at {}", path.display()),
        );

        Self::with_connection(conn, currency, exchange)
    }

    /// Open with the configured path, currency and exchange label
    pub fn open_from_config() -> PipelineResult<Self> {
        let (path, currency, exchange) = crate::config::with_config(|c| {
            (
                c.database.path.clone(),
                c.source.currency.clone(),
                c.source.exchange.clone(),
            )
        });
        let path = if path.trim().is_empty() {
            crate::paths::get_rates_db_path()
        } else {
            path.into()
        };
        Self::open(path, &currency, &exchange)
    }

    pub fn open_in_memory(currency: &str, exchange: &str) -> PipelineResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            PipelineError::Storage(format!("Failed to open in-memory database: {}", e))
        })?;
        Self::with_connection(conn, currency, exchange)
    }

    fn with_connection(conn: Connection, currency: &str, exchange: &str) -> PipelineResult<Self> {
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
            currency: currency.to_string(),
            exchange: exchange.to_string(),
        };
        db.create_tables()?;
        Ok(db)
    }

    fn create_tables(&self) -> PipelineResult<()> {
        let conn = self.lock()?;

        conn.execute_batch(
            r#"
            -- Sampled prices, append-only
            CREATE TABLE IF NOT EXISTS price_samples (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                currency TEXT NOT NULL,
                amount REAL NOT NULL,
                recorded_at TEXT NOT NULL,
                exchange TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_samples_recorded_at ON price_samples(recorded_at);

            -- Single row: last evaluated date + tracked message
            CREATE TABLE IF NOT EXISTS conversation_state (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                last_date TEXT,
                last_message_id INTEGER,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .map_err(|e| PipelineError::Storage(format!("Failed to create tables: {}", e)))?;

        Ok(())
    }

    fn lock(&self) -> PipelineResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| PipelineError::Storage(format!("Lock error: {}", e)))
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn exchange(&self) -> &str {
        &self.exchange
    }
}

#[cfg(test)]
pub(crate) fn test_db() -> HistoryDatabase {
    HistoryDatabase::open_in_memory("USDT", "binancep2p").unwrap()
}
