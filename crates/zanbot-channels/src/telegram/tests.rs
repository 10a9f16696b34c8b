use super::types::{inline_markup, parse_command, TgChat, TgMessage, TgUpdate};
use super::webhook::{build_router, WebhookState};
use super::TelegramChannel;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tower::ServiceExt;
use zanbot_core::config::{HostingMode, TelegramConfig, WebhookConfig};
use zanbot_core::error::ZanError;
use zanbot_core::message::{
    ButtonAction, EventKind, InboundEvent, InlineButton, InlineKeyboard, OutgoingScreen,
};
use zanbot_core::traits::Transport;

// ---------------------------------------------------------------------------
// Update parsing
// ---------------------------------------------------------------------------

#[test]
fn test_parse_command() {
    assert_eq!(parse_command("/start").as_deref(), Some("start"));
    assert_eq!(parse_command("/start@zan_bot").as_deref(), Some("start"));
    assert_eq!(parse_command("/START payload").as_deref(), Some("start"));
    assert_eq!(parse_command("start"), None);
    assert_eq!(parse_command("/"), None);
    assert_eq!(parse_command("   "), None);
}

#[test]
fn test_tg_chat_type_defaults_when_missing() {
    let chat: TgChat = serde_json::from_str(r#"{"id": 123}"#).unwrap();
    assert_eq!(chat.chat_type, "");
}

#[test]
fn test_tg_message_text_only() {
    let json = r#"{
        "message_id": 2,
        "chat": {"id": 100, "type": "private"},
        "text": "hello"
    }"#;
    let msg: TgMessage = serde_json::from_str(json).unwrap();
    assert_eq!(msg.text.as_deref(), Some("hello"));
    assert!(msg.from.is_none());
}

#[test]
fn test_start_command_update_becomes_event() {
    let json = r#"{
        "update_id": 10,
        "message": {
            "message_id": 5,
            "from": {"id": 42, "is_bot": false, "first_name": "Ada", "language_code": "fr-FR"},
            "chat": {"id": 42, "type": "private"},
            "text": "/start"
        }
    }"#;
    let update: TgUpdate = serde_json::from_str(json).unwrap();
    let event = update.into_event().unwrap();
    assert_eq!(event.channel, "telegram");
    assert_eq!(event.sender_id, 42);
    assert_eq!(event.chat_id, 42);
    assert_eq!(event.locale.as_deref(), Some("fr-FR"));
    assert_eq!(
        event.kind,
        EventKind::Command {
            name: "start".to_string()
        }
    );
}

#[test]
fn test_callback_update_becomes_event() {
    let json = r#"{
        "update_id": 11,
        "callback_query": {
            "id": "cbq-1",
            "from": {"id": 42, "is_bot": false, "first_name": "Ada", "language_code": "tr"},
            "message": {
                "message_id": 77,
                "chat": {"id": -500, "type": "group"},
                "text": "menu"
            },
            "chat_instance": "abc",
            "data": "what_is"
        }
    }"#;
    let update: TgUpdate = serde_json::from_str(json).unwrap();
    let event = update.into_event().unwrap();
    assert!(event.is_callback());
    assert_eq!(event.callback_id(), Some("cbq-1"));
    assert_eq!(event.chat_id, -500);
    assert_eq!(event.sender_id, 42);
    assert_eq!(
        event.kind,
        EventKind::Callback {
            query_id: "cbq-1".to_string(),
            data: "what_is".to_string(),
            message_id: Some(77),
        }
    );
}

#[test]
fn test_callback_without_message_uses_sender_chat() {
    let json = r#"{
        "update_id": 12,
        "callback_query": {
            "id": "cbq-2",
            "from": {"id": 9, "first_name": "Bo"},
            "chat_instance": "abc"
        }
    }"#;
    let update: TgUpdate = serde_json::from_str(json).unwrap();
    let event = update.into_event().unwrap();
    assert_eq!(event.chat_id, 9);
    assert_eq!(
        event.kind,
        EventKind::Callback {
            query_id: "cbq-2".to_string(),
            data: String::new(),
            message_id: None,
        }
    );
}

#[test]
fn test_non_command_updates_are_ignored() {
    let plain = r#"{"update_id": 1, "message": {"message_id": 1,
        "from": {"id": 1, "first_name": "A"}, "chat": {"id": 1}, "text": "hi"}}"#;
    let photo = r#"{"update_id": 2, "message": {"message_id": 2,
        "from": {"id": 1, "first_name": "A"}, "chat": {"id": 1}}}"#;
    let bot = r#"{"update_id": 3, "message": {"message_id": 3,
        "from": {"id": 1, "is_bot": true, "first_name": "B"}, "chat": {"id": 1}, "text": "/start"}}"#;
    let edited = r#"{"update_id": 4, "edited_message": {"message_id": 3}}"#;

    for raw in [plain, photo, bot, edited] {
        let update: TgUpdate = serde_json::from_str(raw).unwrap();
        assert!(update.into_event().is_none(), "should ignore {raw}");
    }
}

// ---------------------------------------------------------------------------
// Keyboard markup
// ---------------------------------------------------------------------------

fn sample_keyboard() -> InlineKeyboard {
    InlineKeyboard {
        rows: vec![
            vec![
                InlineButton {
                    label: "Inscription".to_string(),
                    action: ButtonAction::Callback("register".to_string()),
                },
                InlineButton {
                    label: "Connexion".to_string(),
                    action: ButtonAction::Callback("login".to_string()),
                },
            ],
            vec![InlineButton {
                label: "Site web".to_string(),
                action: ButtonAction::Url("https://zancoinmint.com".to_string()),
            }],
        ],
    }
}

#[test]
fn test_inline_markup_preserves_layout() {
    let markup = inline_markup(&sample_keyboard());
    assert_eq!(
        markup,
        json!({
            "inline_keyboard": [
                [
                    {"text": "Inscription", "callback_data": "register"},
                    {"text": "Connexion", "callback_data": "login"}
                ],
                [
                    {"text": "Site web", "url": "https://zancoinmint.com"}
                ]
            ]
        })
    );
}

#[test]
fn test_url_buttons_never_carry_callback_data() {
    let markup = inline_markup(&sample_keyboard());
    let url_button = &markup["inline_keyboard"][1][0];
    assert!(url_button.get("callback_data").is_none());
    assert_eq!(url_button["url"], "https://zancoinmint.com");
}

// ---------------------------------------------------------------------------
// Webhook endpoint
// ---------------------------------------------------------------------------

fn webhook_router(secret: Option<&str>) -> (Router, mpsc::Receiver<InboundEvent>) {
    let (tx, rx) = mpsc::channel(8);
    let state = WebhookState {
        tx,
        secret: secret.map(str::to_string),
        uptime: Instant::now(),
    };
    (build_router(state, "/telegram/webhook"), rx)
}

fn update_request(body: &str, secret: Option<&str>) -> Request<Body> {
    let mut builder = Request::post("/telegram/webhook").header("Content-Type", "application/json");
    if let Some(s) = secret {
        builder = builder.header("X-Telegram-Bot-Api-Secret-Token", s);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Parse response body as JSON.
async fn body_json(resp: axum::http::Response<Body>) -> Value {
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

const START_UPDATE: &str = r#"{"update_id": 1, "message": {"message_id": 1,
    "from": {"id": 5, "first_name": "A", "language_code": "de"},
    "chat": {"id": 5, "type": "private"}, "text": "/start"}}"#;

#[tokio::test]
async fn test_webhook_forwards_update() {
    let (app, mut rx) = webhook_router(None);
    let resp = app.oneshot(update_request(START_UPDATE, None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "accepted");

    let event = rx.recv().await.unwrap();
    assert_eq!(event.sender_id, 5);
    assert_eq!(event.locale.as_deref(), Some("de"));
}

#[tokio::test]
async fn test_webhook_acknowledges_ignored_update() {
    let (app, mut rx) = webhook_router(None);
    let body = r#"{"update_id": 2, "edited_message": {"message_id": 1}}"#;
    let resp = app.oneshot(update_request(body, None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], "ignored");
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn test_webhook_secret_enforced() {
    let (app, mut rx) = webhook_router(Some("s3cret"));
    let resp = app
        .clone()
        .oneshot(update_request(START_UPDATE, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .clone()
        .oneshot(update_request(START_UPDATE, Some("wrong!")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(rx.try_recv().is_err());

    let resp = app
        .oneshot(update_request(START_UPDATE, Some("s3cret")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(rx.recv().await.is_some());
}

#[tokio::test]
async fn test_webhook_rejects_malformed_json() {
    let (app, _rx) = webhook_router(None);
    let resp = app
        .oneshot(update_request("{not json", None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "malformed update");
}

#[tokio::test]
async fn test_webhook_checks_secret_before_parsing() {
    let (app, _rx) = webhook_router(Some("s3cret"));
    for body in ["{not json", r#"{"update_id": "nope"}"#, ""] {
        let resp = app
            .clone()
            .oneshot(update_request(body, Some("wrong!")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "body {body:?}");
        assert_eq!(body_json(resp).await["error"], "invalid secret token");
    }
}

#[tokio::test]
async fn test_webhook_gateway_gone() {
    let (app, rx) = webhook_router(None);
    drop(rx);
    let resp = app.oneshot(update_request(START_UPDATE, None)).await.unwrap();
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_health() {
    let (app, _rx) = webhook_router(Some("s3cret"));
    let req = Request::get("/health").body(Body::empty()).unwrap();
    let resp = app.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = body_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["mode"], "webhook");
}

// ---------------------------------------------------------------------------
// Bot API calls against a local fake
// ---------------------------------------------------------------------------

type Calls = Arc<Mutex<Vec<(String, Value)>>>;

/// One batch handed out by the first `getUpdates` call: a `/start` and a button press.
const UPDATE_BATCH: &str = r#"[
    {"update_id": 40, "message": {"message_id": 7,
        "from": {"id": 5, "is_bot": false, "first_name": "A", "language_code": "tr"},
        "chat": {"id": 5, "type": "private"}, "text": "/start"}},
    {"update_id": 41, "callback_query": {"id": "cbq-1",
        "from": {"id": 5, "is_bot": false, "first_name": "A", "language_code": "tr"},
        "message": {"message_id": 7, "chat": {"id": 5, "type": "private"}},
        "data": "earn"}}
]"#;

/// Fake Bot API: records each call.
///
/// - `editMessageText` answers "not modified" for message 999.
/// - `sendMessage` fails for chat 666.
/// - `setWebhook` fails when the URL path contains `/reject`, and records
///   whether the URL was accepting connections when the call arrived.
/// - `getUpdates` hands out [`UPDATE_BATCH`] when called without an offset,
///   and an empty batch afterwards.
async fn fake_bot_api() -> (String, Calls) {
    async fn handle(
        State(calls): State<Calls>,
        Path(method): Path<String>,
        Json(mut body): Json<Value>,
    ) -> (StatusCode, Json<Value>) {
        if method == "setWebhook" {
            let url = body["url"].as_str().unwrap_or_default().to_string();
            let addr = url
                .trim_start_matches("http://")
                .split('/')
                .next()
                .unwrap_or_default()
                .to_string();
            body["reachable"] = json!(tokio::net::TcpStream::connect(addr).await.is_ok());
            calls.lock().unwrap().push((method, body));
            if url.contains("/reject") {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"ok": false, "error_code": 400,
                        "description": "Bad Request: bad webhook: HTTPS url must be provided"})),
                );
            }
            return (StatusCode::OK, Json(json!({"ok": true, "result": true})));
        }

        calls.lock().unwrap().push((method.clone(), body.clone()));
        if method == "editMessageText" && body["message_id"] == 999 {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"ok": false, "error_code": 400,
                    "description": "Bad Request: message is not modified"})),
            );
        }
        if method == "sendMessage" && body["chat_id"] == 666 {
            return (
                StatusCode::FORBIDDEN,
                Json(json!({"ok": false, "error_code": 403,
                    "description": "Forbidden: bot was blocked by the user"})),
            );
        }
        (StatusCode::OK, Json(json!({"ok": true, "result": true})))
    }

    async fn get_updates(
        State(calls): State<Calls>,
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<Value> {
        calls
            .lock()
            .unwrap()
            .push(("getUpdates".to_string(), json!(params)));
        if params.contains_key("offset") {
            // Stand in for the long-poll wait.
            tokio::time::sleep(Duration::from_millis(20)).await;
            return Json(json!({"ok": true, "result": []}));
        }
        let batch: Value = serde_json::from_str(UPDATE_BATCH).unwrap();
        Json(json!({"ok": true, "result": batch}))
    }

    let calls: Calls = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/botTEST/getUpdates", get(get_updates))
        .route("/botTEST/{method}", post(handle))
        .with_state(calls.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), calls)
}

fn methods(calls: &Calls) -> Vec<String> {
    calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
}

/// A local address nothing is listening on yet.
fn free_addr() -> String {
    let spare = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    spare.local_addr().unwrap().to_string()
}

async fn next_event(rx: &mut mpsc::Receiver<InboundEvent>) -> InboundEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for an event")
        .expect("event stream closed")
}

fn channel_for(api_base_url: String) -> TelegramChannel {
    let config = TelegramConfig {
        bot_token: "TEST".to_string(),
        api_base_url,
    };
    TelegramChannel::new(&config, WebhookConfig::default(), HostingMode::Polling)
}

#[tokio::test]
async fn test_send_screen_posts_keyboard() {
    let (url, calls) = fake_bot_api().await;
    let channel = channel_for(url);
    let screen = OutgoingScreen {
        text: "Bienvenue".to_string(),
        keyboard: Some(sample_keyboard()),
    };

    channel.send_screen(42, &screen).await.unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (method, body) = &calls[0];
    assert_eq!(method, "sendMessage");
    assert_eq!(body["chat_id"], 42);
    assert_eq!(body["text"], "Bienvenue");
    assert_eq!(body["reply_markup"], inline_markup(&sample_keyboard()));
}

#[tokio::test]
async fn test_send_without_keyboard_omits_markup() {
    let (url, calls) = fake_bot_api().await;
    let channel = channel_for(url);
    let screen = OutgoingScreen {
        text: "plain".to_string(),
        keyboard: None,
    };
    channel.send_screen(1, &screen).await.unwrap();
    assert!(calls.lock().unwrap()[0].1.get("reply_markup").is_none());
}

#[tokio::test]
async fn test_api_error_is_channel_error() {
    let (url, _calls) = fake_bot_api().await;
    let channel = channel_for(url);
    let screen = OutgoingScreen::default();
    let err = channel.send_screen(666, &screen).await.unwrap_err();
    match err {
        ZanError::Channel(msg) => assert!(msg.contains("blocked by the user")),
        other => panic!("expected channel error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_edit_not_modified_is_success() {
    let (url, calls) = fake_bot_api().await;
    let channel = channel_for(url);
    let screen = OutgoingScreen {
        text: "same".to_string(),
        keyboard: None,
    };
    channel.edit_screen(1, 999, &screen).await.unwrap();
    channel.edit_screen(1, 5, &screen).await.unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].0, "editMessageText");
    assert_eq!(calls[1].1["message_id"], 5);
}

#[tokio::test]
async fn test_answer_callback_with_toast() {
    let (url, calls) = fake_bot_api().await;
    let channel = channel_for(url);
    channel.answer_callback("q1", None).await.unwrap();
    channel.answer_callback("q2", Some("done")).await.unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls[0].1, json!({"callback_query_id": "q1"}));
    assert_eq!(calls[1].1["text"], "done");
    assert_eq!(calls[1].1["show_alert"], false);
}

#[tokio::test]
async fn test_unreachable_api_is_channel_error() {
    let channel = channel_for("http://127.0.0.1:1".to_string());
    let err = channel
        .answer_callback("q", None)
        .await
        .unwrap_err();
    assert!(matches!(err, ZanError::Channel(_)));
}

// ---------------------------------------------------------------------------
// Startup in each hosting mode
// ---------------------------------------------------------------------------

fn test_config(api_base_url: String) -> TelegramConfig {
    TelegramConfig {
        bot_token: "TEST".to_string(),
        api_base_url,
    }
}

#[tokio::test]
async fn test_polling_start_registers_then_polls() {
    let (url, calls) = fake_bot_api().await;
    let channel = channel_for(url);

    let mut rx = channel.start().await.unwrap();

    let start = next_event(&mut rx).await;
    assert_eq!(
        start.kind,
        EventKind::Command {
            name: "start".into()
        }
    );
    assert_eq!(start.locale.as_deref(), Some("tr"));

    let press = next_event(&mut rx).await;
    assert_eq!(press.chat_id, 5);
    assert_eq!(
        press.kind,
        EventKind::Callback {
            query_id: "cbq-1".into(),
            data: "earn".into(),
            message_id: Some(7),
        }
    );

    // The next poll acknowledges the batch.
    let mut acked = false;
    for _ in 0..100 {
        acked = calls
            .lock()
            .unwrap()
            .iter()
            .any(|(m, p)| m == "getUpdates" && p["offset"] == "42");
        if acked {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(acked, "offset never advanced past update 41");
    channel.stop().await.unwrap();

    let seen = methods(&calls);
    assert_eq!(&seen[..3], ["setMyCommands", "deleteWebhook", "getUpdates"]);
    let calls = calls.lock().unwrap();
    assert!(calls[2].1.get("offset").is_none());
    assert!(calls[2].1["allowed_updates"]
        .as_str()
        .unwrap()
        .contains("callback_query"));
    assert!(!seen.contains(&"setWebhook".to_string()));
}

#[tokio::test]
async fn test_webhook_start_binds_then_registers() {
    let (api, calls) = fake_bot_api().await;
    let listen = free_addr();
    let webhook = WebhookConfig {
        secret_token: "s3cret".into(),
        ..WebhookConfig::default()
    };
    let public = format!("http://{listen}/telegram/webhook");
    let mode = HostingMode::Webhook {
        url: public.clone(),
        listen: listen.clone(),
    };
    let channel = TelegramChannel::new(&test_config(api), webhook, mode);

    let mut rx = channel.start().await.unwrap();

    assert_eq!(methods(&calls), ["setMyCommands", "setWebhook"]);
    {
        let calls = calls.lock().unwrap();
        let body = &calls[1].1;
        assert_eq!(body["url"], public.as_str());
        assert_eq!(body["secret_token"], "s3cret");
        assert_eq!(body["reachable"], true, "server was not bound before setWebhook");
    }

    // Telegram pushes a button press to the live endpoint.
    let update = r#"{"update_id": 9, "callback_query": {"id": "cbq-9",
        "from": {"id": 8, "is_bot": false, "first_name": "B"},
        "message": {"message_id": 3, "chat": {"id": 8, "type": "private"}},
        "data": "back_main"}}"#;
    let resp = reqwest::Client::new()
        .post(&public)
        .header("X-Telegram-Bot-Api-Secret-Token", "s3cret")
        .header("Content-Type", "application/json")
        .body(update)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let event = next_event(&mut rx).await;
    assert_eq!(event.callback_id(), Some("cbq-9"));
    channel.stop().await.unwrap();
}

#[tokio::test]
async fn test_webhook_start_failure_releases_listener() {
    let (api, calls) = fake_bot_api().await;
    let listen = free_addr();
    let mode = HostingMode::Webhook {
        url: format!("http://{listen}/reject"),
        listen: listen.clone(),
    };
    let channel = TelegramChannel::new(&test_config(api), WebhookConfig::default(), mode);

    let err = channel.start().await.unwrap_err();
    assert!(matches!(err, ZanError::Channel(ref m) if m.contains("bad webhook")));
    assert_eq!(calls.lock().unwrap()[1].1["reachable"], true);

    // The aborted server stops accepting connections.
    let mut closed = false;
    for _ in 0..100 {
        if tokio::net::TcpStream::connect(&listen).await.is_err() {
            closed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(closed, "webhook server still listening on {listen}");
}
