use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An inbound event delivered by a transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    pub id: Uuid,
    /// Transport name (e.g. "telegram").
    pub channel: String,
    /// Platform user ID of the acting user. Sessions are keyed by this.
    pub sender_id: i64,
    /// Chat the event came from; replies go here.
    pub chat_id: i64,
    /// Locale tag reported by the platform (e.g. "fr-FR").
    #[serde(default)]
    pub locale: Option<String>,
    pub kind: EventKind,
    pub timestamp: DateTime<Utc>,
}

/// What the user did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// A slash command such as `/start`, without the leading slash or `@botname`.
    Command { name: String },
    /// An inline button press.
    Callback {
        /// Opaque query ID used to acknowledge the press.
        query_id: String,
        /// Navigation identifier carried by the button.
        data: String,
        /// The message the pressed keyboard is attached to, if still accessible.
        message_id: Option<i64>,
    },
}

impl InboundEvent {
    /// Build an event stamped with a fresh ID and the current time.
    pub fn new(
        channel: &str,
        sender_id: i64,
        chat_id: i64,
        locale: Option<String>,
        kind: EventKind,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.to_string(),
            sender_id,
            chat_id,
            locale,
            kind,
            timestamp: Utc::now(),
        }
    }

    pub fn is_callback(&self) -> bool {
        matches!(self.kind, EventKind::Callback { .. })
    }

    /// The callback query ID, if this is a button press.
    pub fn callback_id(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Callback { query_id, .. } => Some(query_id),
            EventKind::Command { .. } => None,
        }
    }
}

/// A rendered inline keyboard, ready for the transport.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

/// One rendered button: a translated label and what pressing it does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineButton {
    pub label: String,
    pub action: ButtonAction,
}

/// A button either navigates (callback payload) or opens a link, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonAction {
    Callback(String),
    Url(String),
}

impl InlineKeyboard {
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(Vec::is_empty)
    }
}

/// A screen ready to deliver: translated body text plus its keyboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingScreen {
    pub text: String,
    #[serde(default)]
    pub keyboard: Option<InlineKeyboard>,
}
