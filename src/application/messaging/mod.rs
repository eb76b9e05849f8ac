//! Message handling - Event-driven message processing

pub mod dispatcher;
pub mod middleware;
pub mod parser;

pub use dispatcher::MessageDispatcher;
pub use middleware::{AudienceMiddleware, LoggingMiddleware, Middleware};
pub use parser::MessageParser;
