//! Delivery of a [`Decision`] through a [`Notifier`]
//!
//! Two-step pipeline: attempt the primary action; when an edit fails, send a
//! new daily message instead. The outcome says which step succeeded and
//! carries the state to persist. Notifier errors never escape as `Err`.

use super::types::{
    Action, ConversationState, Decision, Delivery, DeliveryOutcome, MessageId, MessageKind,
    NotifyWarning,
};
use crate::errors::NotifyError;
use crate::logger::{self, LogTag};
use async_trait::async_trait;

/// Channel the decision is delivered to
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Post a new message, returning its identifier
    async fn send_message(&self, text: &str) -> Result<MessageId, NotifyError>;

    /// Replace the text of an existing message
    async fn edit_message(&self, message_id: MessageId, text: &str) -> Result<(), NotifyError>;
}

/// Run `decision` against `notifier`
///
/// `text` must be rendered for `decision.message_kind()`; the fallback send
/// after a failed edit reuses it (edits are always daily layout).
pub async fn deliver(
    decision: &Decision,
    state: &ConversationState,
    text: &str,
    notifier: &dyn Notifier,
) -> DeliveryOutcome {
    match decision.action {
        Action::EditMessage { message_id } => {
            match notifier.edit_message(message_id, text).await {
                Ok(()) => {
                    logger::debug(LogTag::Alerts, &format!("Edited message {}", message_id));
                    delivered(decision, Delivery::Edited(message_id), Vec::new())
                }
                Err(e) => {
                    logger::warning(
                        LogTag::Alerts,
                        &format!("Could not edit message {}, sending a new one: {}", message_id, e),
                    );
                    let warning = NotifyWarning::EditFellBack {
                        message_id,
                        reason: e.to_string(),
                    };
                    match notifier.send_message(text).await {
                        Ok(new_id) => delivered(
                            decision,
                            Delivery::FellBack {
                                failed_edit: message_id,
                                message_id: new_id,
                            },
                            vec![warning],
                        ),
                        Err(e) => abandoned(state, MessageKind::Daily, e, vec![warning]),
                    }
                }
            }
        }
        Action::SendDaily | Action::SendSpikeAlert { .. } => {
            let kind = decision.message_kind();
            match notifier.send_message(text).await {
                Ok(message_id) => {
                    logger::debug(
                        LogTag::Alerts,
                        &format!("Sent {} message {}", kind, message_id),
                    );
                    delivered(decision, Delivery::Sent { kind, message_id }, Vec::new())
                }
                Err(e) => abandoned(state, kind, e, Vec::new()),
            }
        }
    }
}

fn delivered(
    decision: &Decision,
    delivery: Delivery,
    warnings: Vec<NotifyWarning>,
) -> DeliveryOutcome {
    DeliveryOutcome {
        delivery: Some(delivery),
        state: decision.state_after(delivery.message_id()),
        warnings,
    }
}

/// Send failed: keep the old state so the next run decides "new message" again
fn abandoned(
    state: &ConversationState,
    kind: MessageKind,
    error: NotifyError,
    mut warnings: Vec<NotifyWarning>,
) -> DeliveryOutcome {
    logger::error(
        LogTag::Alerts,
        &format!("Abandoning {} notification: {}", kind, error),
    );
    warnings.push(NotifyWarning::SendFailed {
        kind,
        reason: error.to_string(),
    });
    DeliveryOutcome {
        delivery: None,
        state: *state,
        warnings,
    }
}
