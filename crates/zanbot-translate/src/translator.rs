//! Fail-open translation.
//!
//! Translation is best-effort: the caller always gets displayable text back.
//! The [`Translation`] outcome says which path produced it, so the policy is
//! visible to callers and tests instead of hidden in a catch-all.

use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use zanbot_core::{error::ZanError, language::Language, traits::TranslationBackend};

/// Outcome of one translation attempt.
#[derive(Debug)]
pub enum Translation {
    /// Target was the base language (or empty); the backend was not called.
    Passthrough(String),
    /// The backend returned a translation.
    Translated(String),
    /// The backend failed; carries the original text.
    Fallback { text: String, error: ZanError },
}

impl Translation {
    /// Text to display.
    pub fn text(&self) -> &str {
        match self {
            Self::Passthrough(t) | Self::Translated(t) => t,
            Self::Fallback { text, .. } => text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Passthrough(t) | Self::Translated(t) => t,
            Self::Fallback { text, .. } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Wraps a [`TranslationBackend`] with the base-language short-circuit,
/// an optional deadline, and the fall-back-to-original policy.
#[derive(Clone)]
pub struct Translator {
    backend: Option<Arc<dyn TranslationBackend>>,
    timeout: Option<Duration>,
}

impl Translator {
    pub fn new(backend: Arc<dyn TranslationBackend>, timeout: Option<Duration>) -> Self {
        Self {
            backend: Some(backend),
            timeout: timeout.filter(|t| !t.is_zero()),
        }
    }

    /// A translator that never calls out. Every target renders in English.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            timeout: None,
        }
    }

    /// Backend name for logs and status output.
    pub fn backend_name(&self) -> &str {
        self.backend.as_deref().map_or("disabled", |b| b.name())
    }

    /// Translate base-language `text` into `target` (a language code).
    pub async fn translate(&self, text: &str, target: &str) -> Translation {
        let backend = match &self.backend {
            Some(b) if !needs_passthrough(text, target) => b,
            _ => return Translation::Passthrough(text.to_string()),
        };

        let call = backend.translate(text, target);
        let result = match self.timeout {
            Some(limit) => match tokio::time::timeout(limit, call).await {
                Ok(r) => r,
                Err(_) => Err(ZanError::Translation(format!(
                    "{} timed out after {}ms",
                    backend.name(),
                    limit.as_millis()
                ))),
            },
            None => call.await,
        };

        match result {
            Ok(translated) => Translation::Translated(translated),
            Err(error) => {
                warn!("translation to '{target}' failed, returning original text: {error}");
                Translation::Fallback {
                    text: text.to_string(),
                    error,
                }
            }
        }
    }

    /// Translate and keep only the text.
    pub async fn text(&self, text: &str, lang: Language) -> String {
        self.translate(text, lang.code()).await.into_text()
    }
}

fn needs_passthrough(text: &str, target: &str) -> bool {
    let target = target.trim();
    target.is_empty() || target == Language::BASE.code() || text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Backend that uppercases text, or fails, or stalls, recording every call.
    struct MockBackend {
        calls: Mutex<Vec<(String, String)>>,
        mode: Mode,
    }

    enum Mode {
        Upper,
        Fail,
        Stall,
    }

    impl MockBackend {
        fn new(mode: Mode) -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
                mode,
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TranslationBackend for MockBackend {
        fn name(&self) -> &str {
            "mock"
        }

        async fn translate(&self, text: &str, target: &str) -> Result<String, ZanError> {
            self.calls
                .lock()
                .unwrap()
                .push((text.to_string(), target.to_string()));
            match self.mode {
                Mode::Upper => Ok(format!("[{target}] {}", text.to_uppercase())),
                Mode::Fail => Err(ZanError::Translation("quota exceeded".into())),
                Mode::Stall => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok("too late".into())
                }
            }
        }
    }

    #[tokio::test]
    async fn test_base_language_is_identity_without_backend_call() {
        let backend = MockBackend::new(Mode::Upper);
        let tr = Translator::new(backend.clone(), None);

        let out = tr.translate("Hello", "en").await;
        assert!(matches!(out, Translation::Passthrough(ref t) if t == "Hello"));
        let out = tr.translate("Hello", "").await;
        assert_eq!(out.text(), "Hello");
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_translates_other_targets() {
        let backend = MockBackend::new(Mode::Upper);
        let tr = Translator::new(backend.clone(), None);

        let out = tr.translate("Back", "fr").await;
        assert!(matches!(out, Translation::Translated(_)));
        assert_eq!(out.into_text(), "[fr] BACK");
        assert_eq!(
            backend.calls.lock().unwrap()[0],
            ("Back".to_string(), "fr".to_string())
        );
    }

    #[tokio::test]
    async fn test_backend_failure_returns_original() {
        let backend = MockBackend::new(Mode::Fail);
        let tr = Translator::new(backend.clone(), None);

        for lang in Language::ALL {
            let out = tr.translate("Change Language", lang.code()).await;
            assert_eq!(out.text(), "Change Language");
            assert_eq!(out.is_fallback(), !lang.is_base());
        }
        assert_eq!(backend.call_count(), Language::ALL.len() - 1);
    }

    #[tokio::test]
    async fn test_deadline_falls_back() {
        let backend = MockBackend::new(Mode::Stall);
        let tr = Translator::new(backend, Some(Duration::from_millis(50)));

        let out = tr.translate("Register", "de").await;
        match out {
            Translation::Fallback { text, error } => {
                assert_eq!(text, "Register");
                assert!(error.to_string().contains("timed out"));
            }
            other => panic!("expected fallback, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_disabled_translator_never_translates() {
        let tr = Translator::disabled();
        assert_eq!(tr.backend_name(), "disabled");
        assert_eq!(tr.text("Login", Language::Ru).await, "Login");
    }

    #[tokio::test]
    async fn test_empty_text_skips_backend() {
        let backend = MockBackend::new(Mode::Upper);
        let tr = Translator::new(backend.clone(), None);
        assert_eq!(tr.text("", Language::Tr).await, "");
        assert_eq!(backend.call_count(), 0);
    }
}
