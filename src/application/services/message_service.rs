use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use crate::application::errors::BotError;
use crate::application::messaging::MessageDispatcher;
use crate::domain::entities::Message;
use crate::domain::traits::Bot;

/// Pause before polling again after the platform returned an error
const POLL_ERROR_PAUSE: Duration = Duration::from_secs(5);

/// Service connecting a platform adapter to the dispatcher
pub struct MessageService<B: Bot> {
    bot: Arc<B>,
    dispatcher: Arc<MessageDispatcher>,
    poll_error_pause: Duration,
}

impl<B: Bot + 'static> MessageService<B> {
    pub fn new(bot: B, dispatcher: MessageDispatcher) -> Self {
        Self {
            bot: Arc::new(bot),
            dispatcher: Arc::new(dispatcher),
            poll_error_pause: POLL_ERROR_PAUSE,
        }
    }

    pub fn with_poll_error_pause(mut self, pause: Duration) -> Self {
        self.poll_error_pause = pause;
        self
    }

    pub fn bot(&self) -> &B {
        &self.bot
    }

    /// Receive messages until the adapter closes, handling each one in its
    /// own task. Waits for in-flight replies before returning.
    pub async fn run(&self) -> Result<(), BotError> {
        self.bot.start().await?;

        let info = self.bot.bot_info();
        tracing::info!("Bot started: @{}", info.username);

        let mut tasks = JoinSet::new();

        loop {
            match self.bot.poll_messages().await {
                Ok(Some(messages)) => {
                    for message in messages {
                        let bot = Arc::clone(&self.bot);
                        let dispatcher = Arc::clone(&self.dispatcher);
                        tasks.spawn(async move {
                            handle_message(&*bot, &dispatcher, message).await;
                        });
                    }
                }
                Ok(None) => {
                    tracing::info!("Message source closed, stopping");
                    break;
                }
                Err(e) => {
                    tracing::error!("Failed to get messages: {}", e);
                    tokio::time::sleep(self.poll_error_pause).await;
                }
            }

            // Reap finished handlers so the set does not grow unbounded
            while let Some(joined) = tasks.try_join_next() {
                if let Err(e) = joined {
                    tracing::error!("Message handler panicked: {}", e);
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                tracing::error!("Message handler panicked: {}", e);
            }
        }

        Ok(())
    }

    /// Process a single message and send the reply, if any
    pub async fn process(&self, message: Message) {
        handle_message(&*self.bot, &self.dispatcher, message).await;
    }
}

async fn handle_message<B: Bot + ?Sized>(bot: &B, dispatcher: &MessageDispatcher, message: Message) {
    let Some(message) = dispatcher.accept(message) else {
        return;
    };

    if let Err(e) = bot.send_typing(&message.chat_id).await {
        tracing::debug!("[{}] Typing indicator failed: {}", message.chat_id, e);
    }

    let reply = match dispatcher.respond(&message) {
        Ok(Some(reply)) => reply,
        Ok(None) => return,
        Err(e) => {
            tracing::error!("[{}] Failed to handle message: {}", message.chat_id, e);
            return;
        }
    };

    if let Err(e) = bot.reply(&message, &reply).await {
        tracing::warn!("[{}] Failed to send reply: {}", message.chat_id, e);
    }
}
