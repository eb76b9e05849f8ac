//! Message dispatcher - Routes messages to handlers

use std::sync::Arc;
use crate::domain::entities::{Content, Message};
use crate::application::errors::{BotError, CommandError};
use crate::application::services::CommandService;
use super::parser::MessageParser;
use super::middleware::{Context, Middleware, Next, MiddlewareError};

/// Handler result. `None` means the message gets no reply.
pub type HandlerResult = Result<Option<String>, BotError>;

/// Message dispatcher - routes messages through middleware to handlers
pub struct MessageDispatcher {
    parser: MessageParser,
    middleware: Vec<Arc<dyn Middleware>>,
    commands: CommandService,
}

impl MessageDispatcher {
    pub fn new(parser: MessageParser, commands: CommandService) -> Self {
        Self {
            parser,
            middleware: Vec::new(),
            commands,
        }
    }

    /// Add middleware to the chain
    pub fn with_middleware<M: Middleware + 'static>(mut self, middleware: M) -> Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Run the middleware and parse the message.
    ///
    /// Returns the message with command content when it is addressed to a
    /// known command, `None` when it gets no reply.
    pub fn accept(&self, message: Message) -> Option<Message> {
        let ctx = match Next::new(self.middleware.clone()).run(Context::new(message)) {
            Ok(ctx) => ctx,
            Err(MiddlewareError::Blocked(_)) => return None,
        };

        let mut message = ctx.message;
        if let Content::Text(text) = &message.content {
            message.content = self.parser.parse_content(text);
        }

        let known = match &message.content {
            Content::Command { name, .. } if self.commands.knows(name) => true,
            Content::Command { name, .. } => {
                tracing::debug!("[{}] Ignoring unknown command: {}", message.chat_id, name);
                false
            }
            _ => false,
        };

        known.then_some(message)
    }

    /// Run the command in a message returned by [`accept`](Self::accept)
    pub fn respond(&self, message: &Message) -> HandlerResult {
        let Content::Command { name, args } = &message.content else {
            return Ok(None);
        };

        tracing::debug!("[{}] Command: {} with args: {:?}", message.chat_id, name, args);

        match self.commands.handle(name, args) {
            Ok(reply) => Ok(reply),
            Err(CommandError::InvalidArgs(usage)) => Ok(Some(usage)),
            Err(e) => Err(BotError::Command(e)),
        }
    }

    /// Accept and respond in one step
    pub fn process(&self, message: Message) -> HandlerResult {
        match self.accept(message) {
            Some(message) => self.respond(&message),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::messaging::middleware::AudienceMiddleware;
    use crate::application::services::DiagnosisService;
    use crate::domain::entities::{DiseaseDatabase, DiseaseRecord, User};

    fn dispatcher(allow_private: bool) -> MessageDispatcher {
        let db: DiseaseDatabase = vec![
            DiseaseRecord::new("flu")
                .with_symptoms(["fever", "cough"])
                .with_treatments(["rest"]),
            DiseaseRecord::new("cold")
                .with_symptoms(["cough", "sneeze"])
                .with_treatments(["fluids"]),
        ]
        .into_iter()
        .collect();

        let mut commands = CommandService::new("?");
        commands.register_defaults(DiagnosisService::new(Arc::new(db)));

        MessageDispatcher::new(MessageParser::new("?").with_mention("carebot"), commands)
            .with_middleware(AudienceMiddleware::new(allow_private))
    }

    fn group_message(text: &str) -> Message {
        Message::from_text("group", text)
            .with_sender(User::new("1"))
            .in_group(true)
    }

    fn private_message(text: &str) -> Message {
        Message::from_text("dm", text).with_sender(User::new("1"))
    }

    #[test]
    fn test_diagnose_from_raw_text() {
        let reply = dispatcher(false).process(group_message("?diagnose cough")).unwrap().unwrap();
        assert!(reply.starts_with("You might have: flu, cold\n"));
    }

    #[test]
    fn test_mention_routes_info() {
        let reply = dispatcher(false).process(group_message("@carebot info Flu")).unwrap().unwrap();
        assert_eq!(reply, "Symptoms for flu include: fever, cough\nTreatments include: rest.");
    }

    #[test]
    fn test_usage_reply_for_missing_argument() {
        let reply = dispatcher(false).process(group_message("?info")).unwrap();
        assert_eq!(reply.as_deref(), Some("Usage: ?info <disease>"));
    }

    #[test]
    fn test_silent_cases() {
        let dispatcher = dispatcher(false);

        for text in ["hello there", "?", "?prescribe flu"] {
            assert!(dispatcher.process(group_message(text)).unwrap().is_none(), "{}", text);
        }

        let from_bot = Message::from_text("group", "?help")
            .with_sender(User::new("2").as_bot())
            .in_group(true);
        assert!(dispatcher.process(from_bot).unwrap().is_none());

        // private chat, not allowed
        assert!(dispatcher.process(private_message("?help")).unwrap().is_none());
    }

    #[test]
    fn test_private_chat_when_allowed() {
        let reply = dispatcher(true).process(private_message("?help")).unwrap();
        assert!(reply.is_some());
    }

    #[test]
    fn test_accept_parses_known_commands_only() {
        let dispatcher = dispatcher(false);

        let accepted = dispatcher.accept(group_message("@carebot diagnose fever")).unwrap();
        assert_eq!(
            accepted.content,
            Content::Command { name: "diagnose".to_string(), args: vec!["fever".to_string()] }
        );
        assert_eq!(accepted.chat_id, "group");

        assert!(dispatcher.accept(group_message("?prescribe flu")).is_none());
        assert!(dispatcher.accept(group_message("just text")).is_none());
        assert!(dispatcher.accept(private_message("?help")).is_none());
    }
}
