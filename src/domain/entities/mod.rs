//! Domain entities - Core business objects with no external dependencies

pub mod user;
pub mod message;
pub mod command;
pub mod disease;

pub use user::User;
pub use message::{Message, Content};
pub use command::{Command, CommandRegistry};
pub use disease::{DiseaseDatabase, DiseaseRecord, ScoredCandidate};
