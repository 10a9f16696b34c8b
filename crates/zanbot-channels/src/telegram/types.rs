//! Telegram Bot API deserialization types and conversion into inbound events.

use serde::Deserialize;
use serde_json::{json, Value};
use zanbot_core::message::{ButtonAction, EventKind, InboundEvent, InlineKeyboard};

#[derive(Debug, Deserialize)]
pub(crate) struct TgResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgUpdate {
    pub update_id: i64,
    pub message: Option<TgMessage>,
    pub callback_query: Option<TgCallbackQuery>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(crate) struct TgMessage {
    pub message_id: i64,
    pub from: Option<TgUser>,
    pub chat: TgChat,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TgCallbackQuery {
    pub id: String,
    pub from: TgUser,
    /// Absent when the originating message is too old to be delivered.
    pub message: Option<TgMessage>,
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(crate) struct TgUser {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
    /// IETF language tag of the user's client, e.g. "fr" or "pt-br".
    pub language_code: Option<String>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
pub(crate) struct TgChat {
    pub id: i64,
    /// Chat type: "private", "group", "supergroup", or "channel".
    #[serde(default, rename = "type")]
    pub chat_type: String,
}

/// Parse a `/command@botname args` text into its bare lowercase command name.
pub(crate) fn parse_command(text: &str) -> Option<String> {
    let first = text.split_whitespace().next()?;
    let cmd = first.strip_prefix('/')?;
    // Strip @botname suffix (e.g. "/start@zan_bot" → "start").
    let cmd = cmd.split('@').next().unwrap_or(cmd);
    if cmd.is_empty() {
        return None;
    }
    Some(cmd.to_lowercase())
}

impl TgUpdate {
    /// Convert a raw update into an inbound event.
    ///
    /// Returns `None` for updates the bot does not react to: plain text,
    /// media, messages without a sender, and updates from bots.
    pub(crate) fn into_event(self) -> Option<InboundEvent> {
        if let Some(query) = self.callback_query {
            if query.from.is_bot {
                return None;
            }
            let message_id = query.message.as_ref().map(|m| m.message_id);
            // In private chats the chat ID equals the user ID.
            let chat_id = query
                .message
                .as_ref()
                .map(|m| m.chat.id)
                .unwrap_or(query.from.id);
            return Some(InboundEvent::new(
                "telegram",
                query.from.id,
                chat_id,
                query.from.language_code,
                EventKind::Callback {
                    query_id: query.id,
                    data: query.data.unwrap_or_default(),
                    message_id,
                },
            ));
        }

        let msg = self.message?;
        let user = msg.from?;
        if user.is_bot {
            return None;
        }
        let name = parse_command(msg.text.as_deref()?)?;
        Some(InboundEvent::new(
            "telegram",
            user.id,
            msg.chat.id,
            user.language_code,
            EventKind::Command { name },
        ))
    }
}

/// Render a keyboard as a Bot API `InlineKeyboardMarkup`.
pub(crate) fn inline_markup(keyboard: &InlineKeyboard) -> Value {
    let rows: Vec<Vec<Value>> = keyboard
        .rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|b| match &b.action {
                    ButtonAction::Callback(data) => json!({
                        "text": b.label,
                        "callback_data": data,
                    }),
                    ButtonAction::Url(url) => json!({
                        "text": b.label,
                        "url": url,
                    }),
                })
                .collect()
        })
        .collect();
    json!({ "inline_keyboard": rows })
}
