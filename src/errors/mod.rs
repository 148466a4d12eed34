/// Error taxonomy for the rate pipeline
///
/// `PipelineError` is what pipeline steps return and always ends the run.
/// `NotifyError` is what a `Notifier` returns; the delivery executor absorbs
/// it into a `NotifyWarning`, so it never becomes a `PipelineError`.
use crate::alerts::MessageId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Price source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Another run is in progress (lock file: {path})")]
    Lock { path: String },
}

impl PipelineError {
    /// Short category label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::SourceUnavailable(_) => "source",
            PipelineError::Storage(_) => "storage",
            PipelineError::Config(_) => "config",
            PipelineError::Publish(_) => "publish",
            PipelineError::Lock { .. } => "lock",
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotifyError {
    #[error("Failed to send message: {0}")]
    Send(String),

    #[error("Failed to edit message {message_id}: {reason}")]
    Edit {
        message_id: MessageId,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(PipelineError::SourceUnavailable("timeout".into()).kind(), "source");
        assert_eq!(PipelineError::Storage("locked".into()).kind(), "storage");
        assert_eq!(PipelineError::Lock { path: "x".into() }.kind(), "lock");
    }

    #[test]
    fn test_error_messages() {
        let err = NotifyError::Edit {
            message_id: MessageId(42),
            reason: "message to edit not found".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Failed to edit message 42: message to edit not found"
        );
        assert_eq!(
            PipelineError::Lock { path: "/tmp/x.lock".into() }.to_string(),
            "Another run is in progress (lock file: /tmp/x.lock)"
        );
    }
}
