//! Navigation router: maps triggers to screens.

use crate::catalog::ScreenId;
use zanbot_core::{
    language::Language,
    message::{EventKind, InboundEvent},
};

/// Callback prefix for language selection buttons.
const SETLANG_PREFIX: &str = "setlang_";

/// What the gateway should do for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Show a screen with its own body text.
    Show(ScreenId),
    /// Show the main menu with the "what next?" text.
    BackToMain,
    /// Store the language and return to the main menu.
    SetLanguage(Language),
    /// Nothing to render. Callbacks are still acknowledged.
    Ignore,
}

impl Route {
    /// Route an inbound event.
    pub fn for_event(event: &InboundEvent) -> Self {
        match &event.kind {
            EventKind::Command { name } => Self::parse_command(name),
            EventKind::Callback { data, .. } => Self::parse_trigger(data),
        }
    }

    /// Slash commands. Only `/start` opens anything.
    pub fn parse_command(name: &str) -> Self {
        match name {
            "start" => Self::Show(ScreenId::MainMenu),
            _ => Self::Ignore,
        }
    }

    /// Button callback payloads.
    pub fn parse_trigger(data: &str) -> Self {
        if let Some(code) = data.strip_prefix(SETLANG_PREFIX) {
            return Self::SetLanguage(Language::from_code(code).unwrap_or(Language::BASE));
        }
        match data {
            "back_main" => Self::BackToMain,
            "what_is" => Self::Show(ScreenId::WhatIs),
            "explain" => Self::Show(ScreenId::Explain),
            "network" => Self::Show(ScreenId::Network),
            "game" => Self::Show(ScreenId::Game),
            "earn" => Self::Show(ScreenId::Earn),
            "register" => Self::Show(ScreenId::Register),
            "login" => Self::Show(ScreenId::Login),
            "change_lang" => Self::Show(ScreenId::LanguageSelect),
            _ => Self::Ignore,
        }
    }
}
