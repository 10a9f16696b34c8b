//! Google Translate backend.
//!
//! Uses the keyless `translate_a/single` endpoint with `sl=auto`, the same
//! endpoint the web widget calls. Response shape: `[[["translated", "source", ...], ...], ...]`.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;
use zanbot_core::{error::ZanError, traits::TranslationBackend};

/// Google Translate over HTTPS.
pub struct GoogleTranslate {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleTranslate {
    /// Create from config values. A zero `timeout` means no client-side deadline.
    pub fn from_config(base_url: String, timeout: Duration) -> Result<Self, ZanError> {
        let mut builder = reqwest::Client::builder();
        if !timeout.is_zero() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ZanError::Translation(format!("failed to build http client: {e}")))?;
        Ok(Self { client, base_url })
    }
}

#[async_trait]
impl TranslationBackend for GoogleTranslate {
    fn name(&self) -> &str {
        "google"
    }

    async fn translate(&self, text: &str, target: &str) -> Result<String, ZanError> {
        let url = format!(
            "{}/translate_a/single",
            self.base_url.trim_end_matches('/')
        );
        debug!("google: GET {url} tl={target} ({} chars)", text.chars().count());

        let resp = self
            .client
            .get(&url)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await
            .map_err(|e| ZanError::Translation(format!("google request failed: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ZanError::Translation(format!(
                "google returned {status}: {body}"
            )));
        }

        let raw: Value = resp
            .json()
            .await
            .map_err(|e| ZanError::Translation(format!("google: failed to parse response: {e}")))?;

        parse_response(&raw)
    }
}

/// Join the translated segments of a `translate_a/single` response.
///
/// Long inputs come back split into sentences; each sentence is the first
/// element of its inner array.
pub(crate) fn parse_response(raw: &Value) -> Result<String, ZanError> {
    let sentences = raw
        .get(0)
        .and_then(Value::as_array)
        .ok_or_else(|| ZanError::Translation("google: unexpected response shape".into()))?;

    let translated: String = sentences
        .iter()
        .filter_map(|s| s.get(0).and_then(Value::as_str))
        .collect();

    if translated.is_empty() {
        return Err(ZanError::Translation("google: empty translation".into()));
    }
    Ok(translated)
}
