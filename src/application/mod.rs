//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: Diagnosis, command registry and the message loop
//! - Errors: Domain-specific errors
//! - Messaging: Message parsing, middleware, dispatching

pub mod errors;
pub mod services;
pub mod messaging;
