mod channels;
mod defaults;


pub use channels::*;

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::ZanError;
use defaults::*;

/// Environment variable carrying the Telegram bot token.
pub const ENV_TOKEN: &str = "TELEGRAM_TOKEN";
/// Environment variable carrying the public webhook base URL.
pub const ENV_WEBHOOK_URL: &str = "WEBHOOK_URL";
/// Environment variable carrying the webhook listen port.
pub const ENV_PORT: &str = "PORT";
/// Environment variable carrying the webhook secret token.
pub const ENV_WEBHOOK_SECRET: &str = "WEBHOOK_SECRET";

/// Top-level zanbot configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bot: BotConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
}

/// General bot settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default = "default_name")]
    pub name: String,
    /// Fallback log filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            log_level: default_log_level(),
        }
    }
}

/// Translation backend config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationConfig {
    /// When false, every screen renders in English regardless of session language.
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_translate_url")]
    pub base_url: String,
    /// Deadline for one backend call. 0 = no deadline.
    #[serde(default = "default_translate_timeout")]
    pub timeout_secs: u64,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_translate_url(),
            timeout_secs: default_translate_timeout(),
        }
    }
}

/// How the bot receives updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostingMode {
    /// Long polling via `getUpdates`.
    Polling,
    /// Telegram pushes updates to an HTTP endpoint we serve.
    Webhook {
        /// URL registered with Telegram.
        url: String,
        /// Local address the server binds to.
        listen: String,
    },
}

impl HostingMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Polling => "polling",
            Self::Webhook { .. } => "webhook",
        }
    }
}

impl Config {
    /// Apply environment overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ZanError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides from an arbitrary lookup.
    ///
    /// Empty values are ignored so an exported-but-blank variable does not
    /// wipe a value set in the file.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ZanError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ENV_TOKEN) {
            self.telegram.bot_token = token.trim().to_string();
        }
        if let Some(url) = get(ENV_WEBHOOK_URL) {
            self.webhook.public_url = url.trim().to_string();
        }
        if let Some(port) = get(ENV_PORT) {
            self.webhook.port = port
                .trim()
                .parse()
                .map_err(|e| ZanError::Config(format!("invalid {ENV_PORT} '{port}': {e}")))?;
        }
        if let Some(secret) = get(ENV_WEBHOOK_SECRET) {
            self.webhook.secret_token = secret;
        }
        Ok(())
    }

    /// Refuse to start without a token or with an unservable webhook setup.
    pub fn validate(&self) -> Result<(), ZanError> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(ZanError::Config(format!(
                "{ENV_TOKEN} environment variable is required"
            )));
        }
        if let HostingMode::Webhook { ref url, .. } = self.hosting_mode() {
            if !url.starts_with("https://") && !url.starts_with("http://") {
                return Err(ZanError::Config(format!(
                    "webhook public_url must be an http(s) URL, got '{url}'"
                )));
            }
            if self.webhook.route().trim_end_matches('/') == HEALTH_PATH {
                return Err(ZanError::Config(format!(
                    "webhook path '{}' collides with the {HEALTH_PATH} route",
                    self.webhook.path
                )));
            }
        }
        Ok(())
    }

    /// Pick the hosting mode: a public URL selects webhooks, otherwise long polling.
    pub fn hosting_mode(&self) -> HostingMode {
        if self.webhook.public_url.trim().is_empty() {
            HostingMode::Polling
        } else {
            HostingMode::Webhook {
                url: self.webhook.endpoint_url(),
                listen: self.webhook.listen_addr(),
            }
        }
    }
}

/// Load configuration from a TOML file.
///
/// Falls back to defaults if the file does not exist. Environment overrides
/// are not applied here; call [`Config::apply_env`] afterwards.
pub fn load(path: &str) -> Result<Config, ZanError> {
    let path = Path::new(path);
    if !path.exists() {
        info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ZanError::Config(format!("failed to read {}: {}", path.display(), e)))?;

    let config: Config = toml::from_str(&content)
        .map_err(|e| ZanError::Config(format!("failed to parse config: {}", e)))?;

    Ok(config)
}
