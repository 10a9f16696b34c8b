use super::defaults::*;
use serde::{Deserialize, Serialize};

/// Liveness route served next to the webhook endpoint.
pub const HEALTH_PATH: &str = "/health";

/// Telegram bot config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API token. Overridden by `TELEGRAM_TOKEN`.
    #[serde(default)]
    pub bot_token: String,
    /// Bot API base URL, without the `/bot<token>` suffix.
    #[serde(default = "default_telegram_api_url")]
    pub api_base_url: String,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            api_base_url: default_telegram_api_url(),
        }
    }
}

/// Webhook hosting config. Presence of `public_url` switches from long polling to webhooks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Public base URL Telegram should call (e.g. `https://bot.example.com`).
    /// Empty = long polling. Overridden by `WEBHOOK_URL`.
    #[serde(default)]
    pub public_url: String,
    #[serde(default = "default_webhook_host")]
    pub host: String,
    /// Listen port. Overridden by `PORT`.
    #[serde(default = "default_webhook_port")]
    pub port: u16,
    /// Route the update endpoint is mounted on.
    #[serde(default = "default_webhook_path")]
    pub path: String,
    /// Value Telegram echoes in `X-Telegram-Bot-Api-Secret-Token`. Empty = unchecked.
    /// Overridden by `WEBHOOK_SECRET`.
    #[serde(default)]
    pub secret_token: String,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            public_url: String::new(),
            host: default_webhook_host(),
            port: default_webhook_port(),
            path: default_webhook_path(),
            secret_token: String::new(),
        }
    }
}

impl WebhookConfig {
    /// Full URL registered with `setWebhook`.
    pub fn endpoint_url(&self) -> String {
        let base = self.public_url.trim_end_matches('/');
        let path = self.path.trim_start_matches('/');
        format!("{base}/{path}")
    }

    /// The update route with exactly one leading slash.
    pub fn route(&self) -> String {
        format!("/{}", self.path.trim_start_matches('/'))
    }

    /// Socket address the webhook server binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
