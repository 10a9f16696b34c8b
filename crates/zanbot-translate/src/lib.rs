//! # zanbot-translate
//!
//! Machine translation for zanbot: the Google backend and the fail-open
//! [`Translator`] that screens are rendered through.

pub mod google;
pub mod translator;

pub use google::GoogleTranslate;
pub use translator::{Translation, Translator};
