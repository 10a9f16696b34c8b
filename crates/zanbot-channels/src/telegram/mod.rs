//! Telegram Bot API channel.
//!
//! Receives updates by long polling (`getUpdates`) or by webhook, depending on
//! the configured hosting mode, and renders screens with `sendMessage` /
//! `editMessageText`. Docs: <https://core.telegram.org/bots/api>

mod polling;
pub(crate) mod send;
pub(crate) mod types;
pub(crate) mod webhook;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::info;
use zanbot_core::{
    config::{HostingMode, TelegramConfig, WebhookConfig},
    error::ZanError,
    message::{InboundEvent, OutgoingScreen},
    traits::Transport,
};

/// Telegram channel using the Bot API.
pub struct TelegramChannel {
    mode: HostingMode,
    webhook: WebhookConfig,
    client: reqwest::Client,
    base_url: String,
    /// Tracks the last update_id to avoid reprocessing.
    last_update_id: Arc<Mutex<Option<i64>>>,
    /// Background poll loop or webhook server, aborted on stop.
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl TelegramChannel {
    /// Create a new Telegram channel from config.
    pub fn new(config: &TelegramConfig, webhook: WebhookConfig, mode: HostingMode) -> Self {
        let base_url = format!(
            "{}/bot{}",
            config.api_base_url.trim_end_matches('/'),
            config.bot_token
        );
        Self {
            mode,
            webhook,
            client: reqwest::Client::new(),
            base_url,
            last_update_id: Arc::new(Mutex::new(None)),
            worker: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Transport for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<mpsc::Receiver<InboundEvent>, ZanError> {
        self.register_commands().await;

        let (tx, rx) = mpsc::channel(64);
        let handle = match &self.mode {
            HostingMode::Polling => {
                self.delete_webhook().await;
                self.spawn_polling(tx)
            }
            HostingMode::Webhook { url, listen } => {
                // Bind before registering with Telegram.
                let server = self.spawn_webhook(listen, tx).await?;
                if let Err(e) = self.set_webhook(url).await {
                    server.abort();
                    return Err(e);
                }
                server
            }
        };
        *self.worker.lock().await = Some(handle);

        Ok(rx)
    }

    async fn send_screen(&self, chat_id: i64, screen: &OutgoingScreen) -> Result<(), ZanError> {
        self.send_message(chat_id, screen).await
    }

    async fn edit_screen(
        &self,
        chat_id: i64,
        message_id: i64,
        screen: &OutgoingScreen,
    ) -> Result<(), ZanError> {
        self.edit_message(chat_id, message_id, screen).await
    }

    async fn answer_callback(&self, query_id: &str, toast: Option<&str>) -> Result<(), ZanError> {
        self.answer_callback_query(query_id, toast).await
    }

    async fn stop(&self) -> Result<(), ZanError> {
        if let Some(handle) = self.worker.lock().await.take() {
            handle.abort();
        }
        info!("Telegram channel stopped ({})", self.mode.name());
        Ok(())
    }
}
