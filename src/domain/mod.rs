//! Domain layer - Core business logic with no external dependencies
//! 
//! This layer contains:
//! - Entities: Core business objects (DiseaseRecord, Message, Command)
//! - Traits: Abstractions for infrastructure (Bot)
//! - Rules: Symptom ranking

pub mod entities;
pub mod rules;
pub mod traits;
