//! diagnoser-bot - a chat bot that guesses conditions from reported symptoms
//! and looks up disease information in a static JSON table.

pub mod domain;
pub mod application;
pub mod infrastructure;
