use async_trait::async_trait;
use crate::domain::entities::Message;
use crate::application::errors::BotError;

/// Bot trait - abstraction for messaging platform adapters
#[async_trait]
pub trait Bot: Send + Sync {
    /// Connect to the platform and prepare to receive messages
    async fn start(&self) -> Result<(), BotError>;

    /// Wait for the next batch of inbound messages.
    ///
    /// `Ok(None)` means the message source is closed and the bot should stop.
    async fn poll_messages(&self) -> Result<Option<Vec<Message>>, BotError>;

    /// Send a message to a chat
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<String, BotError>;

    /// Reply to an inbound message. Adapters without threaded replies send
    /// to the message's chat.
    async fn reply(&self, to: &Message, text: &str) -> Result<String, BotError> {
        self.send_message(&to.chat_id, text).await
    }

    /// Show a typing indicator while a reply is being prepared
    async fn send_typing(&self, _chat_id: &str) -> Result<(), BotError> {
        Ok(())
    }

    /// Get bot info
    fn bot_info(&self) -> BotInfo;
}

/// Bot information
#[derive(Debug, Clone)]
pub struct BotInfo {
    pub id: String,
    pub name: String,
    pub username: String,
}
