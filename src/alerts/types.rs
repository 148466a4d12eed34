// Core types for the notification decision engine

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a message in the notification channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i32);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persisted conversation state (one per channel)
///
/// Both fields `None` is the `Idle` state: nothing was ever posted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConversationState {
    pub last_evaluated_date: Option<NaiveDate>,
    pub last_message_id: Option<MessageId>,
}

impl ConversationState {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn posted(date: NaiveDate, message_id: MessageId) -> Self {
        Self {
            last_evaluated_date: Some(date),
            last_message_id: Some(message_id),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.last_evaluated_date.is_none() && self.last_message_id.is_none()
    }

    /// The message that can still be edited in place on `today`
    pub fn editable_message_on(&self, today: NaiveDate) -> Option<MessageId> {
        if self.last_evaluated_date == Some(today) {
            self.last_message_id
        } else {
            None
        }
    }
}

/// Which layout the rendered text must use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    /// Compact daily summary, edited in place during the day
    Daily,
    /// Rich alert with the weekly average and percentage change
    SpikeAlert,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Daily => "daily",
            MessageKind::SpikeAlert => "spike",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Action selected by the engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Action {
    /// Price is above the weekly average by more than the threshold
    SendSpikeAlert { weekly_average: f64, diff: f64 },
    /// New day, or nothing to edit
    SendDaily,
    /// Same day, update the tracked message in place
    EditMessage { message_id: MessageId },
}

impl Action {
    pub fn message_kind(&self) -> MessageKind {
        match self {
            Action::SendSpikeAlert { .. } => MessageKind::SpikeAlert,
            Action::SendDaily | Action::EditMessage { .. } => MessageKind::Daily,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::SendSpikeAlert {
                weekly_average,
                diff,
            } => write!(
                f,
                "send spike alert (avg {:.4}, diff +{:.4})",
                weekly_average, diff
            ),
            Action::SendDaily => write!(f, "send daily message"),
            Action::EditMessage { message_id } => write!(f, "edit message {}", message_id),
        }
    }
}

/// Output of the engine: what to do, for which price, on which day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub action: Action,
    pub price: f64,
    pub today: NaiveDate,
}

impl Decision {
    pub fn message_kind(&self) -> MessageKind {
        self.action.message_kind()
    }

    /// State to persist once `message_id` was delivered for this decision
    pub fn state_after(&self, message_id: MessageId) -> ConversationState {
        ConversationState::posted(self.today, message_id)
    }
}

/// What actually reached the channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delivery {
    /// Edited the tracked message in place
    Edited(MessageId),
    /// Posted a new message of the given kind
    Sent {
        kind: MessageKind,
        message_id: MessageId,
    },
    /// Edit failed, a new daily message was posted instead
    FellBack {
        failed_edit: MessageId,
        message_id: MessageId,
    },
}

impl Delivery {
    pub fn message_id(&self) -> MessageId {
        match self {
            Delivery::Edited(id) => *id,
            Delivery::Sent { message_id, .. } => *message_id,
            Delivery::FellBack { message_id, .. } => *message_id,
        }
    }
}

impl fmt::Display for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delivery::Edited(id) => write!(f, "edited message {}", id),
            Delivery::Sent { kind, message_id } => {
                write!(f, "sent {} message {}", kind, message_id)
            }
            Delivery::FellBack {
                failed_edit,
                message_id,
            } => write!(
                f,
                "edit of {} failed, sent daily message {} instead",
                failed_edit, message_id
            ),
        }
    }
}

/// Non-fatal problems met while delivering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NotifyWarning {
    /// The edit failed and the executor fell back to a new message
    EditFellBack {
        message_id: MessageId,
        reason: String,
    },
    /// A send failed; the action was abandoned and state left unchanged
    SendFailed { kind: MessageKind, reason: String },
}

impl fmt::Display for NotifyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyWarning::EditFellBack { message_id, reason } => write!(
                f,
                "could not edit message {} ({}), sent a new one",
                message_id, reason
            ),
            NotifyWarning::SendFailed { kind, reason } => {
                write!(f, "could not send {} message: {}", kind, reason)
            }
        }
    }
}

/// Result of running a decision against a notifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOutcome {
    /// `None` when the action was abandoned
    pub delivery: Option<Delivery>,
    /// State to persist; equal to the input state when nothing was delivered
    pub state: ConversationState,
    pub warnings: Vec<NotifyWarning>,
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        self.delivery.is_some()
    }

    pub fn state_changed(&self, previous: &ConversationState) -> bool {
        self.state != *previous
    }
}
