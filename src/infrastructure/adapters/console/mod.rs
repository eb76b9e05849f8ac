//! Console adapter for development/testing

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Mutex;
use crate::domain::entities::{Message, User};
use crate::domain::traits::{Bot, BotInfo};
use crate::application::errors::BotError;

const CONSOLE_CHAT: &str = "console";

/// Console bot adapter for local development.
///
/// Every input line is one message from a single local user. The console
/// counts as a group chat so it is answered without `allow-private`.
pub struct ConsoleAdapter<R = BufReader<Stdin>> {
    info: BotInfo,
    lines: Mutex<Lines<R>>,
}

impl ConsoleAdapter {
    pub fn new() -> Self {
        Self::from_reader(BufReader::new(tokio::io::stdin()))
    }
}

impl Default for ConsoleAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: AsyncBufRead + Unpin + Send> ConsoleAdapter<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            info: BotInfo {
                id: "console".to_string(),
                name: "diagnoser-bot".to_string(),
                username: "console".to_string(),
            },
            lines: Mutex::new(reader.lines()),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> Bot for ConsoleAdapter<R> {
    async fn start(&self) -> Result<(), BotError> {
        tracing::info!("Starting console bot (dev mode)");
        Ok(())
    }

    async fn poll_messages(&self) -> Result<Option<Vec<Message>>, BotError> {
        let line = self.lines.lock().await
            .next_line()
            .await
            .map_err(|e| BotError::Internal(format!("Failed to read stdin: {}", e)))?;

        let Some(line) = line else {
            return Ok(None);
        };

        let line = line.trim();
        if line.is_empty() {
            return Ok(Some(Vec::new()));
        }

        let message = Message::from_text(CONSOLE_CHAT, line)
            .with_sender(User::new("local").with_username("you"))
            .with_platform("console")
            .in_group(true);
        Ok(Some(vec![message]))
    }

    async fn send_message(&self, _chat_id: &str, text: &str) -> Result<String, BotError> {
        println!("[BOT] {}", text);
        Ok("console_msg".to_string())
    }

    fn bot_info(&self) -> BotInfo {
        self.info.clone()
    }
}
