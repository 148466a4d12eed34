//! Telegram notifier bound to one channel
//!
//! Implements [`Notifier`] so the delivery executor can send and edit
//! messages without knowing about teloxide.

use crate::alerts::{MessageId, Notifier};
use crate::config::TelegramConfig;
use crate::errors::{NotifyError, PipelineError, PipelineResult};
use crate::logger::{self, LogTag};
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, LinkPreviewOptions, ParseMode};

pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    /// Create a notifier for `chat_id`
    ///
    /// Fails with a configuration error when the token or chat id is empty or
    /// the chat id is not numeric.
    pub fn new(bot_token: &str, chat_id: &str) -> PipelineResult<Self> {
        if bot_token.trim().is_empty() {
            return Err(PipelineError::Config("Telegram bot token is empty".to_string()));
        }

        let chat_id = parse_chat_id(chat_id)?;

        Ok(Self {
            bot: Bot::new(bot_token.trim()),
            chat_id,
        })
    }

    /// `Ok(None)` when notifications are disabled
    pub fn from_settings(settings: &TelegramConfig) -> PipelineResult<Option<Self>> {
        if !settings.enabled {
            return Ok(None);
        }
        Self::new(&settings.bot_token, &settings.chat_id).map(Some)
    }
}

fn parse_chat_id(raw: &str) -> PipelineResult<ChatId> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(PipelineError::Config("Telegram chat ID is empty".to_string()));
    }
    raw.parse::<i64>()
        .map(ChatId)
        .map_err(|e| PipelineError::Config(format!("Invalid chat ID '{}': {}", raw, e)))
}

fn no_preview() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send_message(&self, text: &str) -> Result<MessageId, NotifyError> {
        let message = self
            .bot
            .send_message(self.chat_id, text)
            .parse_mode(ParseMode::Html)
            .link_preview_options(no_preview())
            .await
            .map_err(|e| NotifyError::Send(e.to_string()))?;

        logger::debug(
            LogTag::Telegram,
            &format!(
                "Sent message {} to chat {} (length={})",
                message.id.0,
                self.chat_id,
                text.len()
            ),
        );

        Ok(MessageId(message.id.0))
    }

    async fn edit_message(&self, message_id: MessageId, text: &str) -> Result<(), NotifyError> {
        self.bot
            .edit_message_text(self.chat_id, teloxide::types::MessageId(message_id.0), text)
            .parse_mode(ParseMode::Html)
            .link_preview_options(no_preview())
            .await
            .map_err(|e| NotifyError::Edit {
                message_id,
                reason: e.to_string(),
            })?;

        logger::debug(
            LogTag::Telegram,
            &format!("Edited message {} in chat {}", message_id, self.chat_id),
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_missing_credentials() {
        assert!(matches!(
            TelegramNotifier::new("", "-100123"),
            Err(PipelineError::Config(_))
        ));
        assert!(matches!(
            TelegramNotifier::new("123:abc", " "),
            Err(PipelineError::Config(_))
        ));
    }

    #[test]
    fn test_disabled_settings_skip_validation() {
        let settings = TelegramConfig {
            enabled: false,
            ..TelegramConfig::default()
        };
        assert!(TelegramNotifier::from_settings(&settings).unwrap().is_none());

        let enabled = TelegramConfig {
            bot_token: "123:abc".to_string(),
            chat_id: "-100123".to_string(),
            ..TelegramConfig::default()
        };
        assert!(TelegramNotifier::from_settings(&enabled).unwrap().is_some());
    }

    #[test]
    fn test_parses_channel_chat_id() {
        assert_eq!(parse_chat_id("-1001234567890").unwrap(), ChatId(-1001234567890));
        assert!(matches!(parse_chat_id("@channel"), Err(PipelineError::Config(_))));
    }
}
