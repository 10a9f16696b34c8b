//! Bot API calls: messages, edits, callback answers, commands, and webhook registration.

use super::types::{inline_markup, TgResponse};
use super::TelegramChannel;
use serde_json::Value;
use tracing::{debug, info, warn};
use zanbot_core::{error::ZanError, message::OutgoingScreen};

/// Telegram's reply when an edit would leave the message unchanged.
const NOT_MODIFIED: &str = "message is not modified";

impl TelegramChannel {
    /// POST a Bot API method and unwrap the `{ok, result, description}` envelope.
    pub(crate) async fn call(&self, method: &str, body: &Value) -> Result<Value, ZanError> {
        let url = format!("{}/{method}", self.base_url);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| ZanError::Channel(format!("telegram {method} failed: {e}")))?;

        let status = resp.status();
        let envelope: TgResponse<Value> = resp.json().await.map_err(|e| {
            ZanError::Channel(format!("telegram {method} parse failed ({status}): {e}"))
        })?;

        if !envelope.ok {
            return Err(ZanError::Channel(format!(
                "telegram {method} failed ({status}): {}",
                envelope.description.unwrap_or_default()
            )));
        }
        Ok(envelope.result.unwrap_or(Value::Null))
    }

    /// Send a new message with an optional inline keyboard.
    pub(crate) async fn send_message(
        &self,
        chat_id: i64,
        screen: &OutgoingScreen,
    ) -> Result<(), ZanError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "text": screen.text,
        });
        if let Some(ref kb) = screen.keyboard {
            body["reply_markup"] = inline_markup(kb);
        }
        self.call("sendMessage", &body).await?;
        Ok(())
    }

    /// Edit a message's text and keyboard in place.
    pub(crate) async fn edit_message(
        &self,
        chat_id: i64,
        message_id: i64,
        screen: &OutgoingScreen,
    ) -> Result<(), ZanError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": screen.text,
        });
        if let Some(ref kb) = screen.keyboard {
            body["reply_markup"] = inline_markup(kb);
        }
        match self.call("editMessageText", &body).await {
            Err(ZanError::Channel(e)) if e.contains(NOT_MODIFIED) => {
                debug!("telegram edit of {chat_id}/{message_id} was a no-op");
                Ok(())
            }
            other => other.map(|_| ()),
        }
    }

    /// Stop the button's loading indicator, optionally with a toast.
    pub(crate) async fn answer_callback_query(
        &self,
        query_id: &str,
        toast: Option<&str>,
    ) -> Result<(), ZanError> {
        let mut body = serde_json::json!({ "callback_query_id": query_id });
        if let Some(text) = toast {
            body["text"] = Value::String(text.to_string());
            body["show_alert"] = Value::Bool(false);
        }
        self.call("answerCallbackQuery", &body).await?;
        Ok(())
    }

    /// Register bot commands with Telegram so users see an autocomplete menu.
    /// Best-effort: logs failures but does not propagate errors.
    pub(crate) async fn register_commands(&self) {
        let commands = serde_json::json!({
            "commands": [
                { "command": "start", "description": "Open the main menu" },
            ]
        });

        match self.call("setMyCommands", &commands).await {
            Ok(_) => info!("registered Telegram bot commands"),
            Err(e) => warn!("failed to register Telegram bot commands: {e}"),
        }
    }

    /// Point Telegram at our webhook endpoint.
    pub(crate) async fn set_webhook(&self, url: &str) -> Result<(), ZanError> {
        let mut body = serde_json::json!({
            "url": url,
            "allowed_updates": ["message", "callback_query"],
        });
        if !self.webhook.secret_token.is_empty() {
            body["secret_token"] = Value::String(self.webhook.secret_token.clone());
        }
        self.call("setWebhook", &body).await?;
        info!("registered Telegram webhook at {url}");
        Ok(())
    }

    /// Remove any registered webhook so `getUpdates` is accepted.
    /// Best-effort: a failure surfaces later as a poll error.
    pub(crate) async fn delete_webhook(&self) {
        let body = serde_json::json!({ "drop_pending_updates": false });
        if let Err(e) = self.call("deleteWebhook", &body).await {
            warn!("failed to delete Telegram webhook: {e}");
        }
    }
}
