//! Middleware system for message processing pipeline

use std::sync::Arc;
use crate::domain::entities::Message;

/// Context passed through middleware chain
#[derive(Debug, Clone)]
pub struct Context {
    pub message: Message,
    pub chat_id: String,
    pub user_id: Option<String>,
}

impl Context {
    pub fn new(message: Message) -> Self {
        let chat_id = message.chat_id.clone();
        let user_id = message.sender.as_ref().map(|u| u.id.clone());

        Self {
            message,
            chat_id,
            user_id,
        }
    }
}

/// Middleware trait - processors that can intercept and modify message handling
pub trait Middleware: Send + Sync {
    /// Process a message and optionally modify the context
    fn process(&self, ctx: Context, next: Next) -> MiddlewareResult;
}

/// Result of middleware processing
pub type MiddlewareResult = Result<Context, MiddlewareError>;

/// Middleware errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiddlewareError {
    /// Stop processing silently
    Blocked(String),
}

impl std::fmt::Display for MiddlewareError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MiddlewareError::Blocked(msg) => write!(f, "Blocked: {}", msg),
        }
    }
}

impl std::error::Error for MiddlewareError {}

/// Next middleware in chain
#[derive(Clone)]
pub struct Next {
    remaining: Arc<[Arc<dyn Middleware>]>,
}

impl Next {
    pub fn new(middlewares: Vec<Arc<dyn Middleware>>) -> Self {
        Self {
            remaining: middlewares.into(),
        }
    }

    /// Process remaining middleware
    pub fn run(self, ctx: Context) -> MiddlewareResult {
        match self.remaining.split_first() {
            Some((first, rest)) => {
                let next = Next { remaining: rest.into() };
                first.process(ctx, next)
            }
            // No more middleware, processing complete
            None => Ok(ctx),
        }
    }
}

/// Drops messages the bot should not answer: anything sent by a bot, and
/// private conversations unless they are allowed.
pub struct AudienceMiddleware {
    allow_private: bool,
}

impl AudienceMiddleware {
    pub fn new(allow_private: bool) -> Self {
        Self { allow_private }
    }
}

impl Middleware for AudienceMiddleware {
    fn process(&self, ctx: Context, next: Next) -> MiddlewareResult {
        if ctx.message.from_bot() {
            return Err(MiddlewareError::Blocked("sender is a bot".to_string()));
        }
        if !ctx.message.is_group && !self.allow_private {
            return Err(MiddlewareError::Blocked("private chat".to_string()));
        }
        next.run(ctx)
    }
}

/// Logging middleware for debugging
pub struct LoggingMiddleware;

impl Middleware for LoggingMiddleware {
    fn process(&self, ctx: Context, next: Next) -> MiddlewareResult {
        let msg_preview = ctx.message.content.text()
            .map(|s| s.chars().take(50).collect::<String>())
            .unwrap_or_else(|| "[command]".to_string());
        let chat_id = ctx.chat_id.clone();
        let sender = ctx.message.sender.as_ref()
            .map(|u| u.to_string())
            .unwrap_or_else(|| "unknown".to_string());

        tracing::debug!("[{}] {}: {}", chat_id, sender, msg_preview);

        let result = next.run(ctx);

        if let Err(e) = &result {
            tracing::debug!("[{}] {}", chat_id, e);
        }

        result
    }
}
