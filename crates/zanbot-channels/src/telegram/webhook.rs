//! Webhook HTTP server.
//!
//! Telegram POSTs each update as JSON to the configured path. Updates are
//! converted and pushed into the same event channel the polling loop feeds.
//! `GET /health` reports liveness for the hosting platform.

use super::types::TgUpdate;
use super::TelegramChannel;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use zanbot_core::{config::HEALTH_PATH, error::ZanError, message::InboundEvent};

/// Header Telegram uses to echo the secret registered with `setWebhook`.
const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Shared state for webhook handlers.
#[derive(Clone)]
pub(crate) struct WebhookState {
    pub tx: mpsc::Sender<InboundEvent>,
    pub secret: Option<String>,
    pub uptime: Instant,
}

/// Constant-time string comparison to prevent timing attacks on the secret token.
fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

/// Check the secret header. Returns `None` if authorized, `Some(response)` if rejected.
fn check_secret(headers: &HeaderMap, secret: &Option<String>) -> Option<(StatusCode, Json<Value>)> {
    let expected = secret.as_ref()?;

    let provided = headers.get(SECRET_HEADER).and_then(|h| h.to_str().ok());
    match provided {
        Some(token) if constant_time_eq(token, expected) => None,
        _ => Some((
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid secret token"})),
        )),
    }
}

/// `POST <path>`: one Telegram update.
///
/// The body is only parsed once the secret checks out, so unauthenticated
/// callers always see the same 401.
async fn receive_update(
    headers: HeaderMap,
    State(state): State<WebhookState>,
    body: Bytes,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if let Some(err) = check_secret(&headers, &state.secret) {
        warn!("webhook: rejected update with bad secret token");
        return Err(err);
    }

    let update: TgUpdate = serde_json::from_slice(&body).map_err(|e| {
        warn!("webhook: malformed update: {e}");
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "malformed update"})),
        )
    })?;

    let update_id = update.update_id;
    let Some(event) = update.into_event() else {
        debug!("telegram: ignoring update {update_id}");
        return Ok(Json(json!({"status": "ignored"})));
    };

    state.tx.send(event).await.map_err(|_| {
        error!("webhook: gateway receiver dropped");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": "gateway unavailable"})),
        )
    })?;

    Ok(Json(json!({"status": "accepted"})))
}

/// `GET /health`: liveness with uptime.
async fn health(State(state): State<WebhookState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "mode": "webhook",
        "uptime_secs": state.uptime.elapsed().as_secs(),
    }))
}

/// Build the webhook router with the update endpoint mounted at `route`.
pub(crate) fn build_router(state: WebhookState, route: &str) -> Router {
    Router::new()
        .route(HEALTH_PATH, get(health))
        .route(route, post(receive_update))
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024)) // 1 MB max request body
        .with_state(state)
}

impl TelegramChannel {
    /// Bind the listen address and serve webhook requests in the background.
    pub(super) async fn spawn_webhook(
        &self,
        listen: &str,
        tx: mpsc::Sender<InboundEvent>,
    ) -> Result<JoinHandle<()>, ZanError> {
        let secret = if self.webhook.secret_token.is_empty() {
            None
        } else {
            Some(self.webhook.secret_token.clone())
        };
        let state = WebhookState {
            tx,
            secret,
            uptime: Instant::now(),
        };
        let app = build_router(state, &self.webhook.route());

        let listener = tokio::net::TcpListener::bind(listen)
            .await
            .map_err(|e| ZanError::Channel(format!("webhook failed to bind {listen}: {e}")))?;

        info!("Telegram webhook listening on {listen}{}", self.webhook.route());

        Ok(tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                error!("webhook server error: {e}");
            }
        }))
    }
}
