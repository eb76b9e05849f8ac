//! Application services - Business logic orchestration

pub mod command_service;
pub mod diagnosis_service;
pub mod message_service;

pub use command_service::CommandService;
pub use diagnosis_service::DiagnosisService;
pub use message_service::MessageService;
