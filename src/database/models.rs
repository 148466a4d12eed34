// Row types for the rate history database

use chrono::{Duration, NaiveDateTime, NaiveTime};
use crate::config::MAX_AVERAGE_WINDOW_DAYS;
use serde::{Deserialize, Serialize};

/// Timestamp layout stored in `recorded_at` (sorts lexicographically)
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date layout stored in `conversation_state.last_date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// One sampled price
///
/// Serialized with the field names the static frontend reads from data.json.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    #[serde(rename = "moneda")]
    pub currency: String,
    #[serde(rename = "cotizacion")]
    pub amount: f64,
    #[serde(rename = "datetime")]
    pub recorded_at: String,
    pub exchange: String,
}

impl PriceSample {
    pub fn recorded_at_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.recorded_at, TIMESTAMP_FORMAT).ok()
    }
}

/// Trailing window the weekly average is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AverageWindow {
    pub days: i64,
    /// false: `[midnight - days, midnight)`; true: `[now - days, now]`
    pub includes_today: bool,
}

impl Default for AverageWindow {
    fn default() -> Self {
        Self {
            days: 7,
            includes_today: false,
        }
    }
}

impl AverageWindow {
    pub fn from_config() -> Self {
        crate::config::with_config(|c| Self {
            days: c.alerts.average_window_days,
            includes_today: c.alerts.average_includes_today,
        })
    }

    /// Half-open `[start, end)` bounds for an evaluation at `now`
    ///
    /// Timestamps have second resolution, so the inclusive `now` end is
    /// expressed as `now + 1s`.
    /// `days` is clamped to `0..=MAX_AVERAGE_WINDOW_DAYS`.
    pub fn bounds(&self, now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
        let days = Duration::days(self.days.clamp(0, MAX_AVERAGE_WINDOW_DAYS));
        let back = |t: NaiveDateTime| t.checked_sub_signed(days).unwrap_or(NaiveDateTime::MIN);
        if self.includes_today {
            let end = now
                .checked_add_signed(Duration::seconds(1))
                .unwrap_or(NaiveDateTime::MAX);
            (back(now), end)
        } else {
            let midnight = now.date().and_time(NaiveTime::MIN);
            (back(midnight), midnight)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap()
    }

    #[test]
    fn test_previous_week_window_excludes_today() {
        let window = AverageWindow::default();
        let (start, end) = window.bounds(at("2024-05-01 14:30:00"));
        assert_eq!(start, at("2024-04-24 00:00:00"));
        assert_eq!(end, at("2024-05-01 00:00:00"));
    }

    #[test]
    fn test_rolling_window_includes_now() {
        let window = AverageWindow {
            days: 7,
            includes_today: true,
        };
        let (start, end) = window.bounds(at("2024-05-01 14:30:00"));
        assert_eq!(start, at("2024-04-24 14:30:00"));
        assert_eq!(end, at("2024-05-01 14:30:01"));
    }

    #[test]
    fn test_oversized_window_is_clamped() {
        let window = AverageWindow {
            days: i64::MAX,
            includes_today: false,
        };
        let now = at("2024-05-01 14:30:00");
        let (start, end) = window.bounds(now);
        assert_eq!(end, at("2024-05-01 00:00:00"));
        assert_eq!(end - start, Duration::days(MAX_AVERAGE_WINDOW_DAYS));
    }

    #[test]
    fn test_sample_serializes_with_frontend_field_names() {
        let sample = PriceSample {
            currency: "USDT".to_string(),
            amount: 6.97,
            recorded_at: "2024-05-01 10:00:00".to_string(),
            exchange: "binancep2p".to_string(),
        };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["moneda"], "USDT");
        assert_eq!(json["cotizacion"], 6.97);
        assert_eq!(json["datetime"], "2024-05-01 10:00:00");
        assert_eq!(json["exchange"], "binancep2p");
        assert_eq!(sample.recorded_at_datetime(), Some(at("2024-05-01 10:00:00")));
    }
}
