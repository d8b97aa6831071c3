use crate::error::BotError;
use crate::telegram::TelegramClient;
use async_trait::async_trait;
use std::path::Path;

pub type ChatId = i64;

/// Outbound side of the chat channel.
#[async_trait]
pub trait Delivery: Send + Sync {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), BotError>;

    /// Sends the file at `path` as an attachment named `file_name`.
    async fn send_document(&self, chat: ChatId, path: &Path, file_name: &str, caption: &str) -> Result<(), BotError>;
}

#[async_trait]
impl Delivery for TelegramClient {
    async fn send_text(&self, chat: ChatId, text: &str) -> Result<(), BotError> {
        self.send_message(chat, text).await?;
        Ok(())
    }

    async fn send_document(&self, chat: ChatId, path: &Path, file_name: &str, caption: &str) -> Result<(), BotError> {
        TelegramClient::send_document(self, chat, path, file_name, caption).await?;
        Ok(())
    }
}
