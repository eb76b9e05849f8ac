//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use crate::application::errors::ConfigError;
use crate::domain::rules::RankingSettings;
use crate::domain::rules::ranking::{DEFAULT_MIN_SCORE, DEFAULT_RESULT_COUNT};

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub bot: BotConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub diagnosis: DiagnosisConfig,
    #[serde(default)]
    pub adapters: AdaptersConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct BotConfig {
    pub name: String,
    pub prefix: String,
    /// Answer in private chats, not only in groups
    #[serde(default)]
    pub allow_private: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DiagnosisConfig {
    pub result_count: usize,
    pub min_score: f64,
}

impl Default for DiagnosisConfig {
    fn default() -> Self {
        Self {
            result_count: DEFAULT_RESULT_COUNT,
            min_score: DEFAULT_MIN_SCORE,
        }
    }
}

impl DiagnosisConfig {
    pub fn ranking_settings(&self) -> RankingSettings {
        RankingSettings {
            min_score: self.min_score,
            result_count: self.result_count,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct AdaptersConfig {
    pub telegram: Option<TelegramConfig>,
    pub console: Option<ConsoleConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TelegramConfig {
    pub enabled: bool,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ConsoleConfig {
    pub enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                name: "diagnoser-bot".to_string(),
                prefix: "?".to_string(),
                allow_private: false,
            },
            database: DatabaseConfig {
                path: Some(PathBuf::from("diseases.json")),
            },
            diagnosis: DiagnosisConfig::default(),
            adapters: AdaptersConfig {
                telegram: Some(TelegramConfig {
                    enabled: true,
                    token: None,
                }),
                console: Some(ConsoleConfig {
                    enabled: false,
                }),
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))
    }

    /// Overlay `BOT_TOKEN`, `BOT_PREFIX` and `DISEASE_DB`
    pub fn apply_env(&mut self) {
        self.apply_vars(|key| std::env::var(key).ok());
    }

    fn apply_vars(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(token) = var("BOT_TOKEN") {
            self.set_token(token);
        }

        if let Some(prefix) = var("BOT_PREFIX") {
            self.bot.prefix = prefix;
        }

        if let Some(path) = var("DISEASE_DB") {
            self.database.path = Some(PathBuf::from(path));
        }
    }

    /// Set the Telegram token, enabling the adapter
    pub fn set_token(&mut self, token: impl Into<String>) {
        let tg = self.adapters.telegram.get_or_insert(TelegramConfig {
            enabled: true,
            token: None,
        });
        tg.token = Some(token.into());
        tg.enabled = true;
    }

    /// Token of the enabled Telegram adapter, if any
    pub fn telegram_token(&self) -> Option<&str> {
        self.adapters.telegram
            .as_ref()
            .filter(|t| t.enabled)
            .and_then(|t| t.token.as_deref())
            .filter(|t| !t.is_empty())
    }

    /// Telegram bots in privacy mode only see `/commands` and mentions in
    /// groups, so any other marker is never delivered there.
    pub fn group_privacy_hint(&self) -> Option<String> {
        if self.bot.prefix == "/" {
            return None;
        }
        Some(format!(
            "Telegram group privacy mode hides `{}` commands from the bot; \
             mention it (`@bot diagnose ...`), set prefix to \"/\", or disable privacy mode with @BotFather",
            self.bot.prefix
        ))
    }

    pub fn console_enabled(&self) -> bool {
        self.adapters.console.as_ref().is_some_and(|c| c.enabled)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bot.prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue("bot.prefix must not be empty".to_string()));
        }
        if self.diagnosis.result_count == 0 {
            return Err(ConfigError::InvalidValue("diagnosis.result-count must be at least 1".to_string()));
        }
        if !self.diagnosis.min_score.is_finite() || self.diagnosis.min_score < 0.0 {
            return Err(ConfigError::InvalidValue(format!(
                "diagnosis.min-score must be a non-negative number, got {}",
                self.diagnosis.min_score
            )));
        }
        Ok(())
    }
}
