// Price sample storage: insert, trailing average, full history, pruning, export

use super::models::{AverageWindow, PriceSample, TIMESTAMP_FORMAT};
use super::HistoryDatabase;
use crate::errors::{PipelineError, PipelineResult};
use crate::logger::{self, LogTag};
use chrono::{Duration, Local, NaiveDateTime};
use rusqlite::{params, Result as SqliteResult};
use std::path::Path;

impl HistoryDatabase {
    /// Store a sample stamped with the local wall clock
    ///
    /// The source's own `time` field is ignored: it can repeat a cached value
    /// across consecutive calls.
    pub fn insert_sample(&self, amount: f64) -> PipelineResult<PriceSample> {
        self.insert_sample_at(amount, Local::now().naive_local())
    }

    pub fn insert_sample_at(&self, amount: f64, at: NaiveDateTime) -> PipelineResult<PriceSample> {
        let sample = PriceSample {
            currency: self.currency.clone(),
            amount,
            recorded_at: at.format(TIMESTAMP_FORMAT).to_string(),
            exchange: self.exchange.clone(),
        };

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO price_samples (currency, amount, recorded_at, exchange)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                &sample.currency,
                sample.amount,
                &sample.recorded_at,
                &sample.exchange
            ],
        )
        .map_err(|e| PipelineError::Storage(format!("Failed to insert sample: {}", e)))?;

        logger::debug(
            LogTag::Database,
            &format!(
                "Inserted sample {} {:.4} at {}",
                sample.currency, sample.amount, sample.recorded_at
            ),
        );

        Ok(sample)
    }

    /// Mean amount inside `window` evaluated at `now`; `None` without samples
    pub fn weekly_average(
        &self,
        window: &AverageWindow,
        now: NaiveDateTime,
    ) -> PipelineResult<Option<f64>> {
        let (start, end) = window.bounds(now);
        let conn = self.lock()?;

        let average: Option<f64> = conn
            .query_row(
                "SELECT AVG(amount) FROM price_samples
                 WHERE recorded_at >= ?1 AND recorded_at < ?2",
                params![
                    start.format(TIMESTAMP_FORMAT).to_string(),
                    end.format(TIMESTAMP_FORMAT).to_string()
                ],
                |row| row.get(0),
            )
            .map_err(|e| PipelineError::Storage(format!("Failed to compute average: {}", e)))?;

        Ok(average)
    }

    /// Every sample, oldest first
    pub fn get_all_samples(&self) -> PipelineResult<Vec<PriceSample>> {
        self.query_samples(
            "SELECT currency, amount, recorded_at, exchange FROM price_samples
             ORDER BY recorded_at ASC, id ASC",
        )
    }

    /// Most recent `limit` samples, newest first
    pub fn get_recent_samples(&self, limit: usize) -> PipelineResult<Vec<PriceSample>> {
        self.query_samples(&format!(
            "SELECT currency, amount, recorded_at, exchange FROM price_samples
             ORDER BY recorded_at DESC, id DESC LIMIT {}",
            limit
        ))
    }

    fn query_samples(&self, sql: &str) -> PipelineResult<Vec<PriceSample>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| PipelineError::Storage(format!("Failed to prepare statement: {}", e)))?;

        let samples = stmt
            .query_map([], |row| {
                Ok(PriceSample {
                    currency: row.get(0)?,
                    amount: row.get(1)?,
                    recorded_at: row.get(2)?,
                    exchange: row.get(3)?,
                })
            })
            .map_err(|e| PipelineError::Storage(format!("Query failed: {}", e)))?
            .collect::<SqliteResult<Vec<_>>>()
            .map_err(|e| PipelineError::Storage(format!("Failed to read rows: {}", e)))?;

        Ok(samples)
    }

    pub fn count_samples(&self) -> PipelineResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM price_samples", [], |row| row.get(0))
            .map_err(|e| PipelineError::Storage(format!("Failed to count samples: {}", e)))?;
        Ok(count as usize)
    }

    /// Delete samples recorded before `now - max_age`; returns how many
    pub fn delete_older_than(&self, max_age: Duration, now: NaiveDateTime) -> PipelineResult<usize> {
        // A cutoff before the representable range means nothing is old enough
        let Some(cutoff) = now.checked_sub_signed(max_age) else {
            return Ok(0);
        };
        let cutoff = cutoff.format(TIMESTAMP_FORMAT).to_string();
        let conn = self.lock()?;

        let deleted = conn
            .execute(
                "DELETE FROM price_samples WHERE recorded_at < ?1",
                params![cutoff],
            )
            .map_err(|e| PipelineError::Storage(format!("Failed to prune samples: {}", e)))?;

        logger::debug(
            LogTag::Database,
            &format!("Pruned {} samples older than {}", deleted, cutoff),
        );

        Ok(deleted)
    }

    /// Write the full history as a pretty JSON array; returns the sample count
    pub fn export_samples_json(&self, output_path: &Path) -> PipelineResult<usize> {
        let samples = self.get_all_samples()?;

        let data = serde_json::to_string_pretty(&samples)
            .map_err(|e| PipelineError::Publish(format!("Failed to serialize samples: {}", e)))?;

        if let Some(parent) = output_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PipelineError::Publish(format!(
                    "Failed to create output directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        std::fs::write(output_path, data).map_err(|e| {
            PipelineError::Publish(format!(
                "Failed to write {}: {}",
                output_path.display(),
                e
            ))
        })?;

        Ok(samples.len())
    }
}
