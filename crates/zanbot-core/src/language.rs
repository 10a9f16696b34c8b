//! Supported languages and locale normalization.
//!
//! All catalog content is authored in English; every other language is
//! reached through the translation backend. A `Language` value is always a
//! member of the supported set, so a session can never hold anything else.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A language the bot can render screens in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Tr,
    Ar,
    Es,
    Fr,
    De,
    Ru,
    Fa,
    Hi,
    Ur,
}

impl Language {
    /// The language all content is authored in.
    pub const BASE: Language = Language::En;

    /// Every supported language, in picker order.
    pub const ALL: [Language; 10] = [
        Language::En,
        Language::Tr,
        Language::Ar,
        Language::Es,
        Language::Fr,
        Language::De,
        Language::Ru,
        Language::Fa,
        Language::Hi,
        Language::Ur,
    ];

    /// Two-letter code used in callback payloads and translation requests.
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Tr => "tr",
            Self::Ar => "ar",
            Self::Es => "es",
            Self::Fr => "fr",
            Self::De => "de",
            Self::Ru => "ru",
            Self::Fa => "fa",
            Self::Hi => "hi",
            Self::Ur => "ur",
        }
    }

    /// The language's name written in that language.
    pub fn native_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Tr => "T\u{00fc}rk\u{00e7}e",
            Self::Ar => "\u{0627}\u{0644}\u{0639}\u{0631}\u{0628}\u{064a}\u{0629}",
            Self::Es => "Espa\u{00f1}ol",
            Self::Fr => "Fran\u{00e7}ais",
            Self::De => "Deutsch",
            Self::Ru => "\u{0420}\u{0443}\u{0441}\u{0441}\u{043a}\u{0438}\u{0439}",
            Self::Fa => "\u{0641}\u{0627}\u{0631}\u{0633}\u{06cc}",
            Self::Hi => "\u{0939}\u{093f}\u{0928}\u{094d}\u{0926}\u{0940}",
            Self::Ur => "\u{0627}\u{0631}\u{062f}\u{0648}",
        }
    }

    /// Exact lookup of a supported code. Case-sensitive, no region handling.
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.code() == code)
    }

    /// Map an arbitrary client locale tag onto a supported language.
    ///
    /// Lower-cases the tag, drops everything after the first hyphen, then
    /// tries a full match and a two-character prefix match. Anything else,
    /// including an absent or empty tag, resolves to [`Language::BASE`].
    pub fn normalize(tag: Option<&str>) -> Self {
        let Some(tag) = tag.map(str::trim).filter(|t| !t.is_empty()) else {
            return Self::BASE;
        };
        let lowered = tag.to_lowercase();
        let primary = lowered.split('-').next().unwrap_or_default();
        if let Some(lang) = Self::from_code(primary) {
            return lang;
        }
        primary
            .get(..2)
            .and_then(Self::from_code)
            .unwrap_or(Self::BASE)
    }

    pub fn is_base(&self) -> bool {
        *self == Self::BASE
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
