//! Gateway: the main event loop connecting the transport, sessions, and translator.
//!
//! Events for the same chat are handled one at a time in arrival order.
//! Different chats proceed concurrently.

pub mod render;
pub mod router;


use crate::catalog::{self, Catalog, ScreenId};
use router::Route;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};
use zanbot_core::{
    error::ZanError,
    message::{InboundEvent, OutgoingScreen},
    traits::{SessionStore, Transport},
};
use zanbot_translate::Translator;

/// Routes inbound events to rendered screens.
pub struct Gateway {
    pub(super) transport: Arc<dyn Transport>,
    pub(super) translator: Translator,
    pub(super) sessions: Arc<dyn SessionStore>,
    pub(super) catalog: Arc<Catalog>,
    /// Chats with an event in flight. Later events for the same chat queue here.
    pub(super) active_chats: Mutex<HashMap<i64, Vec<InboundEvent>>>,
}

impl Gateway {
    pub fn new(
        transport: Arc<dyn Transport>,
        translator: Translator,
        sessions: Arc<dyn SessionStore>,
        catalog: Arc<Catalog>,
    ) -> Self {
        Self {
            transport,
            translator,
            sessions,
            catalog,
            active_chats: Mutex::new(HashMap::new()),
        }
    }

    /// Run the main event loop until Ctrl-C or the transport closes.
    pub async fn run(self: Arc<Self>) -> anyhow::Result<()> {
        info!(
            "ZanCoin gateway running | transport: {} | translation: {}",
            self.transport.name(),
            self.translator.backend_name(),
        );

        let mut rx = self
            .transport
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start transport {}: {e}", self.transport.name()))?;

        loop {
            tokio::select! {
                event = rx.recv() => {
                    let Some(event) = event else {
                        warn!("transport event stream closed");
                        break;
                    };
                    let gw = self.clone();
                    tokio::spawn(async move {
                        gw.dispatch_event(event).await;
                    });
                }
                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        info!("Shutting down...");
        if let Err(e) = self.transport.stop().await {
            warn!("failed to stop transport {}: {e}", self.transport.name());
        }
        info!("Shutdown complete.");
        Ok(())
    }

    /// Dispatch an event: queue it if its chat is busy, otherwise process it
    /// and then drain whatever queued up meanwhile.
    pub(super) async fn dispatch_event(self: Arc<Self>, event: InboundEvent) {
        let chat_id = event.chat_id;

        {
            let mut active = self.active_chats.lock().await;
            if let Some(queue) = active.get_mut(&chat_id) {
                debug!("queued event {} for busy chat {chat_id}", event.id);
                queue.push(event);
                return;
            }
            active.insert(chat_id, Vec::new());
        }

        self.process_event(&event).await;

        loop {
            let next = {
                let mut active = self.active_chats.lock().await;
                match active.get_mut(&chat_id) {
                    Some(queue) if !queue.is_empty() => Some(queue.remove(0)),
                    _ => {
                        active.remove(&chat_id);
                        None
                    }
                }
            };

            match next {
                Some(queued) => self.process_event(&queued).await,
                None => break,
            }
        }
    }

    /// Handle one event; on failure, log it and apologise to the user.
    pub(super) async fn process_event(&self, event: &InboundEvent) {
        if let Err(e) = self.handle_event(event).await {
            error!(
                "failed to handle event {} from user {} in chat {}: {e}",
                event.id, event.sender_id, event.chat_id
            );
            self.apologise(event).await;
        }
    }

    /// Route an event and render the resulting screen.
    pub(super) async fn handle_event(&self, event: &InboundEvent) -> Result<(), ZanError> {
        let route = Route::for_event(event);
        debug!("event {} routed to {route:?}", event.id);

        match route {
            Route::Show(id) => {
                let screen = self.catalog.screen(id);
                self.render(event, screen.text, &screen.rows, None).await
            }
            Route::BackToMain => {
                let menu = self.catalog.screen(ScreenId::MainMenu);
                self.render(event, catalog::RETURN_TEXT, &menu.rows, None)
                    .await
            }
            Route::SetLanguage(lang) => {
                self.sessions.set_language(event.sender_id, lang);
                info!("user {} switched language to {lang}", event.sender_id);
                let toast = self
                    .translator
                    .text(&catalog::language_set_text(lang), lang)
                    .await;
                let menu = self.catalog.screen(ScreenId::MainMenu);
                self.render(event, menu.text, &menu.rows, Some(&toast)).await
            }
            Route::Ignore => {
                if let Some(query_id) = event.callback_id() {
                    self.acknowledge(query_id, None).await;
                }
                Ok(())
            }
        }
    }

    /// Best-effort apology in the user's language. Never fails.
    async fn apologise(&self, event: &InboundEvent) {
        let lang = self.resolve_language(event);
        let text = self.translator.text(catalog::ERROR_TEXT, lang).await;

        if let Some(query_id) = event.callback_id() {
            self.acknowledge(query_id, None).await;
        }

        let screen = OutgoingScreen {
            text,
            keyboard: None,
        };
        if let Err(e) = self.transport.send_screen(event.chat_id, &screen).await {
            warn!("failed to send error notice to chat {}: {e}", event.chat_id);
        }
    }
}
