// Notification decision engine
// Decides between editing the day's message, posting a new daily message or
// posting a spike alert, and delivers that decision with an edit→send fallback.

mod engine;
mod executor;
mod types;

pub use engine::{DecisionEngine, DEFAULT_SPIKE_THRESHOLD};
pub use executor::{deliver, Notifier};
pub use types::{
    Action, ConversationState, Decision, Delivery, DeliveryOutcome, MessageId, MessageKind,
    NotifyWarning,
};

#[cfg(test)]
pub(crate) use executor::tests::{Call, MockNotifier};
