//! Message parser - Turns raw chat text into commands

use crate::domain::entities::{Content, Message, User};

/// Recognises commands addressed to the bot.
///
/// A command starts with the configured marker or with a mention of the
/// bot, followed by the command word and its arguments.
#[derive(Debug, Clone)]
pub struct MessageParser {
    command_prefix: String,
    mention: Option<String>,
}

impl MessageParser {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            command_prefix: prefix.into(),
            mention: None,
        }
    }

    /// Also accept `@username` in place of the marker
    pub fn with_mention(mut self, username: impl Into<String>) -> Self {
        let username = username.into();
        let username = username.trim_start_matches('@');
        if !username.is_empty() {
            self.mention = Some(username.to_string());
        }
        self
    }

    /// Parse raw text.
    ///
    /// Text without a marker stays `Content::Text`; a bare marker with
    /// nothing after it is `Content::Empty`.
    pub fn parse_content(&self, text: &str) -> Content {
        let text = text.trim();
        let Some(rest) = self.strip_marker(text) else {
            return Content::Text(text.to_string());
        };

        let mut words = rest.split_whitespace();
        let Some(first) = words.next() else {
            return Content::Empty;
        };

        let name = self.strip_addressee(first).to_string();
        let args = words.map(str::to_string).collect();
        Content::Command { name, args }
    }

    fn strip_marker<'a>(&self, text: &'a str) -> Option<&'a str> {
        if let Some(rest) = strip_prefix_ignore_case(text, &self.command_prefix) {
            return Some(rest);
        }
        let mention = self.mention.as_ref()?;
        let rest = strip_prefix_ignore_case(text, &format!("@{}", mention))?;
        // `@carebot_dev` is another bot
        match rest.chars().next() {
            None => Some(rest),
            Some(c) if c.is_whitespace() => Some(rest),
            Some(_) => None,
        }
    }

    /// `/help@carebot` -> `help` when addressed to this bot
    fn strip_addressee<'a>(&self, word: &'a str) -> &'a str {
        match (word.split_once('@'), &self.mention) {
            (Some((name, target)), Some(mention)) if target.eq_ignore_ascii_case(mention) => name,
            _ => word,
        }
    }
}

fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    if prefix.is_empty() {
        return None;
    }
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        text.get(prefix.len()..)
    } else {
        None
    }
}

impl Message {
    /// Helper to set sender as Option
    pub fn with_sender_opt(mut self, user: Option<User>) -> Self {
        if let Some(u) = user {
            self.sender = Some(u);
        }
        self
    }
}
