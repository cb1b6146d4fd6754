//! Wraps teloxide::Bot and implements [`bcast_core::Gateway`]. Production
//! code sends through Telegram; tests substitute another Gateway impl.

use async_trait::async_trait;
use bcast_core::{BcastError, Gateway, Result};
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, MessageId};

/// Thin wrapper around teloxide::Bot that implements the gateway trait.
pub struct TelegramGateway {
    bot: teloxide::Bot,
}

impl TelegramGateway {
    /// Creates a gateway from an existing teloxide Bot.
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }
}

/// Parses a message id string into an i32. Used by edit_text.
pub fn parse_message_id(s: &str) -> Result<i32> {
    s.parse()
        .map_err(|_| BcastError::Gateway(format!("Invalid message_id for edit: {}", s)))
}

#[async_trait]
impl Gateway for TelegramGateway {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat_id), text.to_string())
            .await
            .map_err(|e| BcastError::Gateway(e.to_string()))?;
        Ok(())
    }

    async fn send_image(&self, chat_id: i64, image: &[u8], caption: &str) -> Result<()> {
        self.bot
            .send_photo(ChatId(chat_id), InputFile::memory(image.to_vec()))
            .caption(caption.to_string())
            .await
            .map_err(|e| BcastError::Gateway(e.to_string()))?;
        Ok(())
    }

    async fn send_text_and_return_id(&self, chat_id: i64, text: &str) -> Result<String> {
        let sent = self
            .bot
            .send_message(ChatId(chat_id), text.to_string())
            .await
            .map_err(|e| BcastError::Gateway(e.to_string()))?;
        Ok(sent.id.to_string())
    }

    async fn edit_text(&self, chat_id: i64, message_id: &str, text: &str) -> Result<()> {
        let id = parse_message_id(message_id)?;
        self.bot
            .edit_message_text(ChatId(chat_id), MessageId(id), text.to_string())
            .await
            .map_err(|e| BcastError::Gateway(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telegram_gateway_new() {
        let _gateway = TelegramGateway::new(teloxide::Bot::new("dummy_token".to_string()));
    }

    #[test]
    fn test_parse_message_id_valid() {
        assert_eq!(parse_message_id("123").unwrap(), 123);
        assert_eq!(parse_message_id("0").unwrap(), 0);
    }

    #[test]
    fn test_parse_message_id_invalid() {
        assert!(parse_message_id("").is_err());
        assert!(parse_message_id("abc").is_err());
        assert!(parse_message_id("12.3").is_err());
    }
}
