//! Bot settings read from the environment.

use std::time::Duration;

use trivia_game::GameConfig;
use trivia_protocol::Difficulty;
use trivia_provider::ProviderConfig;

/// A setting in the environment could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the `trivia-bot` binary needs to start.
///
/// | Variable | Default |
/// |---|---|
/// | `TRIVIA_BIND` | `127.0.0.1:8080` |
/// | `TRIVIA_CHANNEL` | `trivia` |
/// | `TRIVIA_API_URL` | `https://opentdb.com/api.php` |
/// | `TRIVIA_HTTP_TIMEOUT_SECS` | `10` |
/// | `TRIVIA_DIFFICULTY` | `medium` |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    pub bind: String,
    pub channel: String,
    pub api_url: String,
    pub http_timeout: Duration,
    pub difficulty: Difficulty,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:8080".to_string(),
            channel: "trivia".to_string(),
            api_url: "https://opentdb.com/api.php".to_string(),
            http_timeout: Duration::from_secs(10),
            difficulty: Difficulty::Medium,
        }
    }
}

impl BotConfig {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenv::dotenv() {
            tracing::debug!(error = %e, "no .env file loaded");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from `lookup`, which maps a variable name to its
    /// value. Unset or blank variables keep their default.
    pub fn from_lookup(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let mut config = Self::default();

        if let Some(bind) = get("TRIVIA_BIND") {
            config.bind = bind;
        }
        if let Some(channel) = get("TRIVIA_CHANNEL") {
            config.channel = channel.trim_start_matches('#').to_string();
        }
        if let Some(url) = get("TRIVIA_API_URL") {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid {
                    key: "TRIVIA_API_URL",
                    value: url,
                    reason: "expected an http:// or https:// URL".into(),
                });
            }
            config.api_url = url;
        }
        if let Some(secs) = get("TRIVIA_HTTP_TIMEOUT_SECS") {
            let parsed = secs.parse::<u64>().map_err(|e| ConfigError::Invalid {
                key: "TRIVIA_HTTP_TIMEOUT_SECS",
                value: secs.clone(),
                reason: e.to_string(),
            })?;
            config.http_timeout = Duration::from_secs(parsed);
        }
        if let Some(level) = get("TRIVIA_DIFFICULTY") {
            config.difficulty =
                level.parse::<Difficulty>().map_err(|e| ConfigError::Invalid {
                    key: "TRIVIA_DIFFICULTY",
                    value: level.clone(),
                    reason: e.to_string(),
                })?;
        }

        Ok(config)
    }

    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig {
            base_url: self.api_url.clone(),
            timeout: self.http_timeout,
            ..ProviderConfig::default()
        }
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig {
            difficulty: self.difficulty,
            ..GameConfig::default()
        }
    }
}
