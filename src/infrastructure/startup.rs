//! Startup checks - everything that must succeed before the bot connects

use std::sync::Arc;
use crate::application::errors::{BotError, ConfigError};
use crate::application::services::{CommandService, DiagnosisService};
use crate::infrastructure::config::Config;
use crate::infrastructure::storage;

/// Where messages come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Telegram { token: String },
    Console,
}

/// A validated config with the database loaded and commands registered
pub struct Prepared {
    pub platform: Platform,
    pub commands: CommandService,
}

impl std::fmt::Debug for Prepared {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prepared")
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

/// Validate `config`, pick the platform and load the disease database.
///
/// Fails on a missing token (unless the console is used) and on a missing
/// or malformed database. No adapter exists until this returns `Ok`.
pub fn prepare(config: &Config, console: bool) -> Result<Prepared, BotError> {
    config.validate()?;

    let platform = match config.telegram_token() {
        _ if console || config.console_enabled() => Platform::Console,
        Some(token) => Platform::Telegram { token: token.to_string() },
        None => {
            return Err(ConfigError::MissingField(
                "bot token (use --token, BOT_TOKEN, or --console)".to_string(),
            ).into());
        }
    };

    let db_path = config.database.path.as_deref().ok_or_else(|| {
        ConfigError::MissingField("database path (use --database or DISEASE_DB)".to_string())
    })?;
    let database = Arc::new(storage::load_database(db_path)?);
    tracing::info!("Loaded {} diseases from {}", database.len(), db_path.display());

    let diagnosis = DiagnosisService::new(database)
        .with_settings(config.diagnosis.ranking_settings());
    let mut commands = CommandService::new(&config.bot.prefix);
    commands.register_defaults(diagnosis);

    Ok(Prepared { platform, commands })
}
