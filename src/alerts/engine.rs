//! Notification decision engine
//!
//! Pure mapping of (price, weekly average, conversation state, today) to an
//! [`Action`]. First match wins:
//!
//! 1. spike: `weekly_average > 0 && price - weekly_average > threshold`
//! 2. new message: different day, or no message to edit
//! 3. edit the tracked message in place
//!
//! No I/O happens here; the executor delivers the decision and the caller
//! persists the resulting state.

use super::types::{Action, ConversationState, Decision};
use crate::config::with_config;
use chrono::NaiveDate;

pub const DEFAULT_SPIKE_THRESHOLD: f64 = 0.50;

/// Slack for the strict threshold comparison
///
/// Prices carry at most 4 decimals, so a real excess is at least 1e-4; float
/// noise from subtracting decimal prices is around 1e-15.
const THRESHOLD_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionEngine {
    spike_threshold: f64,
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new(DEFAULT_SPIKE_THRESHOLD)
    }
}

impl DecisionEngine {
    pub fn new(spike_threshold: f64) -> Self {
        Self { spike_threshold }
    }

    pub fn from_config() -> Self {
        Self::new(with_config(|c| c.alerts.spike_threshold))
    }

    pub fn spike_threshold(&self) -> f64 {
        self.spike_threshold
    }

    /// Difference over the average when it qualifies as a spike
    ///
    /// A missing, zero or negative average is "no baseline": never a spike.
    pub fn spike_diff(&self, price: f64, weekly_average: Option<f64>) -> Option<(f64, f64)> {
        let average = weekly_average.filter(|avg| avg.is_finite() && *avg > 0.0)?;
        let diff = price - average;
        (diff - self.spike_threshold > THRESHOLD_EPSILON).then_some((average, diff))
    }

    pub fn decide(
        &self,
        price: f64,
        weekly_average: Option<f64>,
        state: &ConversationState,
        today: NaiveDate,
    ) -> Decision {
        let action = if let Some((weekly_average, diff)) = self.spike_diff(price, weekly_average) {
            Action::SendSpikeAlert {
                weekly_average,
                diff,
            }
        } else if let Some(message_id) = state.editable_message_on(today) {
            Action::EditMessage { message_id }
        } else {
            Action::SendDaily
        };

        Decision {
            action,
            price,
            today,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::types::{MessageId, MessageKind};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn engine() -> DecisionEngine {
        DecisionEngine::new(0.50)
    }

    #[test]
    fn test_same_day_small_move_edits_tracked_message() {
        let today = date("2024-05-01");
        let state = ConversationState::posted(today, MessageId(42));

        let decision = engine().decide(6.97, Some(6.90), &state, today);

        assert_eq!(
            decision.action,
            Action::EditMessage {
                message_id: MessageId(42)
            }
        );
        assert_eq!(decision.message_kind(), MessageKind::Daily);
        // Edit success keeps the id
        assert_eq!(decision.state_after(MessageId(42)), state);
    }

    #[test]
    fn test_spike_sends_alert_even_with_same_day_message() {
        let today = date("2024-05-01");
        let state = ConversationState::posted(today, MessageId(42));

        let decision = engine().decide(7.60, Some(6.90), &state, today);

        match decision.action {
            Action::SendSpikeAlert {
                weekly_average,
                diff,
            } => {
                assert_eq!(weekly_average, 6.90);
                assert!((diff - 0.70).abs() < 1e-9);
            }
            other => panic!("expected spike alert, got {:?}", other),
        }
        assert_eq!(decision.message_kind(), MessageKind::SpikeAlert);
        assert_eq!(
            decision.state_after(MessageId(43)),
            ConversationState::posted(today, MessageId(43))
        );
    }

    #[test]
    fn test_threshold_boundary_is_exclusive() {
        let today = date("2024-05-01");
        let state = ConversationState::posted(today, MessageId(7));

        // 6.5 - 6.0 == 0.5 exactly in binary floating point
        let decision = engine().decide(6.5, Some(6.0), &state, today);
        assert_eq!(
            decision.action,
            Action::EditMessage {
                message_id: MessageId(7)
            }
        );

        let decision = engine().decide(6.5001, Some(6.0), &state, today);
        assert_eq!(decision.message_kind(), MessageKind::SpikeAlert);
    }

    #[test]
    fn test_two_decimal_prices_exactly_at_threshold_never_spike() {
        let today = date("2024-05-01");
        let engine = engine();

        // 8.05 - 7.55 evaluates to 0.5000000000000009 in f64
        assert_eq!(engine.spike_diff(8.05, Some(7.55)), None);

        for cents in 600..1300 {
            let average = cents as f64 / 100.0;

            let at_threshold = (cents + 50) as f64 / 100.0;
            let decision = engine.decide(at_threshold, Some(average), &ConversationState::idle(), today);
            assert_eq!(
                decision.action,
                Action::SendDaily,
                "{} over {} must not spike",
                at_threshold,
                average
            );

            let one_cent_over = (cents + 51) as f64 / 100.0;
            assert!(
                engine.spike_diff(one_cent_over, Some(average)).is_some(),
                "{} over {} must spike",
                one_cent_over,
                average
            );
        }
    }

    #[test]
    fn test_no_baseline_never_spikes() {
        let today = date("2024-05-01");
        let idle = ConversationState::idle();

        for average in [None, Some(0.0), Some(-3.0), Some(f64::NAN)] {
            let decision = engine().decide(1_000.0, average, &idle, today);
            assert_eq!(decision.action, Action::SendDaily, "average {:?}", average);
        }
    }

    #[test]
    fn test_new_day_sends_daily_message() {
        let state = ConversationState::posted(date("2024-04-30"), MessageId(42));
        let today = date("2024-05-01");

        let decision = engine().decide(6.95, Some(6.90), &state, today);

        assert_eq!(decision.action, Action::SendDaily);
        assert_eq!(
            decision.state_after(MessageId(50)),
            ConversationState::posted(today, MessageId(50))
        );
    }

    #[test]
    fn test_missing_message_id_sends_daily_on_same_day() {
        let today = date("2024-05-01");
        let state = ConversationState {
            last_evaluated_date: Some(today),
            last_message_id: None,
        };

        let decision = engine().decide(6.95, Some(6.90), &state, today);
        assert_eq!(decision.action, Action::SendDaily);
    }

    #[test]
    fn test_idle_state_sends_daily_message() {
        let decision = engine().decide(6.95, None, &ConversationState::idle(), date("2024-05-01"));
        assert_eq!(decision.action, Action::SendDaily);
    }

    #[test]
    fn test_repeated_spikes_same_day_each_send_new_message() {
        let today = date("2024-05-01");
        let first = engine().decide(7.60, Some(6.90), &ConversationState::idle(), today);
        let state = first.state_after(MessageId(100));

        let second = engine().decide(7.70, Some(6.90), &state, today);
        assert_eq!(second.message_kind(), MessageKind::SpikeAlert);
    }

    #[test]
    fn test_same_inputs_same_decision() {
        let today = date("2024-05-01");
        let state = ConversationState::posted(today, MessageId(9));
        let a = engine().decide(6.91, Some(6.90), &state, today);
        let b = engine().decide(6.91, Some(6.90), &state, today);
        assert_eq!(a, b);
    }

    #[test]
    fn test_custom_threshold() {
        let today = date("2024-05-01");
        let strict = DecisionEngine::new(0.05);
        let decision = strict.decide(6.97, Some(6.90), &ConversationState::idle(), today);
        assert_eq!(decision.message_kind(), MessageKind::SpikeAlert);
    }
}
