//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Disease database loading
//! - Adapters: Platform integrations (Telegram, console)
//! - Startup: Checks run before any adapter connects

pub mod config;
pub mod storage;
pub mod adapters;
pub mod startup;
