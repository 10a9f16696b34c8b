use crate::{
    error::ZanError,
    language::Language,
    message::{InboundEvent, OutgoingScreen},
};
use async_trait::async_trait;

/// Chat transport: how events arrive and screens leave.
///
/// The Telegram channel implements this for both long polling and webhook
/// hosting; the gateway only ever sees the trait.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Human-readable transport name.
    fn name(&self) -> &str;

    /// Start receiving events.
    /// Returns a receiver that yields inbound events.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<InboundEvent>, ZanError>;

    /// Send a new message to a chat.
    async fn send_screen(&self, chat_id: i64, screen: &OutgoingScreen) -> Result<(), ZanError>;

    /// Replace the text and keyboard of an existing message.
    async fn edit_screen(
        &self,
        chat_id: i64,
        message_id: i64,
        screen: &OutgoingScreen,
    ) -> Result<(), ZanError>;

    /// Acknowledge a button press, optionally showing a short toast.
    async fn answer_callback(&self, query_id: &str, toast: Option<&str>) -> Result<(), ZanError>;

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), ZanError>;
}

/// Machine translation backend.
///
/// Source language is always auto-detected; only the target is given.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Translate `text` into the language identified by `target`.
    async fn translate(&self, text: &str, target: &str) -> Result<String, ZanError>;
}

/// Per-user session storage. Holds only the chosen language.
pub trait SessionStore: Send + Sync {
    /// The stored language for `user_id`, if any.
    fn language(&self, user_id: i64) -> Option<Language>;

    /// Store `lang` for `user_id`, replacing any previous choice.
    fn set_language(&self, user_id: i64, lang: Language);
}
