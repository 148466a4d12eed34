// Persistence of the singleton conversation state row

use super::models::{DATE_FORMAT, TIMESTAMP_FORMAT};
use super::HistoryDatabase;
use crate::alerts::{ConversationState, MessageId};
use crate::errors::{PipelineError, PipelineResult};
use crate::logger::{self, LogTag};
use chrono::{Local, NaiveDate};
use rusqlite::{params, OptionalExtension};

impl HistoryDatabase {
    /// Load the conversation state; a missing row is `Idle`
    pub fn get_conversation_state(&self) -> PipelineResult<ConversationState> {
        let conn = self.lock()?;

        let row: Option<(Option<String>, Option<i64>)> = conn
            .query_row(
                "SELECT last_date, last_message_id FROM conversation_state WHERE id = 1",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| PipelineError::Storage(format!("Failed to read conversation state: {}", e)))?;

        let Some((last_date, last_message_id)) = row else {
            return Ok(ConversationState::idle());
        };

        let last_evaluated_date = match last_date {
            Some(raw) => match NaiveDate::parse_from_str(&raw, DATE_FORMAT) {
                Ok(date) => Some(date),
                Err(e) => {
                    // Treated as "no date": the next run starts a new message
                    logger::warning(
                        LogTag::Database,
                        &format!("Ignoring unparsable last_date '{}': {}", raw, e),
                    );
                    None
                }
            },
            None => None,
        };

        let last_message_id = last_message_id.and_then(|id| match i32::try_from(id) {
            Ok(id) => Some(MessageId(id)),
            Err(_) => {
                logger::warning(
                    LogTag::Database,
                    &format!("Ignoring out-of-range last_message_id {}", id),
                );
                None
            }
        });

        Ok(ConversationState {
            last_evaluated_date,
            last_message_id,
        })
    }

    /// Replace the stored conversation state
    pub fn update_conversation_state(&self, state: &ConversationState) -> PipelineResult<()> {
        let last_date = state
            .last_evaluated_date
            .map(|d| d.format(DATE_FORMAT).to_string());
        let last_message_id = state.last_message_id.map(|id| id.0 as i64);
        let updated_at = Local::now().naive_local().format(TIMESTAMP_FORMAT).to_string();

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO conversation_state (id, last_date, last_message_id, updated_at)
             VALUES (1, ?1, ?2, ?3)
             ON CONFLICT(id) DO UPDATE SET
                last_date = excluded.last_date,
                last_message_id = excluded.last_message_id,
                updated_at = excluded.updated_at",
            params![last_date, last_message_id, updated_at],
        )
        .map_err(|e| PipelineError::Storage(format!("Failed to save conversation state: {}", e)))?;

        logger::debug(
            LogTag::Database,
            &format!(
                "Saved conversation state: date={:?} message={:?}",
                last_date, last_message_id
            ),
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::alerts::{ConversationState, MessageId};
    use crate::database::test_db;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_fresh_database_is_idle() {
        let db = test_db();
        assert!(db.get_conversation_state().unwrap().is_idle());
    }

    #[test]
    fn test_state_round_trips_and_overwrites() {
        let db = test_db();

        let first = ConversationState::posted(date("2024-04-30"), MessageId(41));
        db.update_conversation_state(&first).unwrap();
        assert_eq!(db.get_conversation_state().unwrap(), first);

        let second = ConversationState::posted(date("2024-05-01"), MessageId(42));
        db.update_conversation_state(&second).unwrap();
        assert_eq!(db.get_conversation_state().unwrap(), second);

        let rows: i64 = db
            .lock()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM conversation_state", [], |r| r.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_corrupt_date_reads_as_missing() {
        let db = test_db();
        db.lock()
            .unwrap()
            .execute(
                "INSERT INTO conversation_state (id, last_date, last_message_id, updated_at)
                 VALUES (1, 'yesterday', 9, '2024-05-01 00:00:00')",
                [],
            )
            .unwrap();

        let state = db.get_conversation_state().unwrap();
        assert_eq!(state.last_evaluated_date, None);
        assert_eq!(state.last_message_id, Some(MessageId(9)));
        assert_eq!(state.editable_message_on(date("2024-05-01")), None);
    }
}
