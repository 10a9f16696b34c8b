//! Screen rendering: language resolution, translated keyboards, and delivery.

use super::Gateway;
use crate::catalog::Button;
use tracing::debug;
use zanbot_core::{
    error::ZanError,
    language::Language,
    message::{ButtonAction, EventKind, InboundEvent, InlineButton, InlineKeyboard, OutgoingScreen},
};
use zanbot_translate::Translator;

/// Translate every label into `lang`. Actions (callback payloads and URLs) pass through untouched.
pub async fn build_keyboard(
    translator: &Translator,
    rows: &[Vec<Button>],
    lang: Language,
) -> InlineKeyboard {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let mut buttons = Vec::with_capacity(row.len());
        for button in row {
            buttons.push(InlineButton {
                label: translator.text(&button.label, lang).await,
                action: button.action.clone(),
            });
        }
        out.push(buttons);
    }
    InlineKeyboard { rows: out }
}

/// Translate a screen's body and buttons.
pub async fn render_screen(
    translator: &Translator,
    text: &str,
    rows: &[Vec<Button>],
    lang: Language,
) -> OutgoingScreen {
    let text = translator.text(text, lang).await;
    let keyboard = build_keyboard(translator, rows, lang).await;
    OutgoingScreen {
        text,
        keyboard: (!keyboard.is_empty()).then_some(keyboard),
    }
}

/// Plain-text view of a rendered screen, used by `zanbot preview`.
pub fn describe(screen: &OutgoingScreen) -> String {
    let mut out = screen.text.clone();
    if let Some(kb) = &screen.keyboard {
        out.push('\n');
        for row in &kb.rows {
            let cells: Vec<String> = row
                .iter()
                .map(|b| match &b.action {
                    ButtonAction::Callback(data) => format!("[{}] -> {data}", b.label),
                    ButtonAction::Url(url) => format!("[{}] -> {url}", b.label),
                })
                .collect();
            out.push('\n');
            out.push_str(&cells.join("  "));
        }
    }
    out
}

impl Gateway {
    /// The user's language: the stored choice, else the platform locale.
    /// A first-contact locale is cached so later screens do not depend on it.
    pub(super) fn resolve_language(&self, event: &InboundEvent) -> Language {
        if let Some(lang) = self.sessions.language(event.sender_id) {
            return lang;
        }
        let lang = Language::normalize(event.locale.as_deref());
        self.sessions.set_language(event.sender_id, lang);
        debug!(
            "cached language {lang} for user {} from locale {:?}",
            event.sender_id, event.locale
        );
        lang
    }

    /// Translate and deliver a screen in response to `event`.
    ///
    /// Button presses are acknowledged first (with `toast` if given), then the
    /// pressed message is edited in place. Commands always get a new message.
    pub(super) async fn render(
        &self,
        event: &InboundEvent,
        text: &str,
        rows: &[Vec<Button>],
        toast: Option<&str>,
    ) -> Result<(), ZanError> {
        let lang = self.resolve_language(event);
        if let Some(query_id) = event.callback_id() {
            self.acknowledge(query_id, toast).await;
        }

        let screen = render_screen(&self.translator, text, rows, lang).await;
        match &event.kind {
            EventKind::Callback {
                message_id: Some(id),
                ..
            } => self.transport.edit_screen(event.chat_id, *id, &screen).await,
            _ => self.transport.send_screen(event.chat_id, &screen).await,
        }
    }

    /// Answer a callback query. Failures are logged and dropped.
    pub(super) async fn acknowledge(&self, query_id: &str, toast: Option<&str>) {
        if let Err(e) = self.transport.answer_callback(query_id, toast).await {
            debug!("failed to answer callback {query_id}: {e}");
        }
    }
}
