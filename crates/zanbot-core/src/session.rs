//! In-memory session store. Lives for the process lifetime.

use crate::{language::Language, traits::SessionStore};
use std::collections::HashMap;
use std::sync::Mutex;

/// Session store backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemorySessions {
    languages: Mutex<HashMap<i64, Language>>,
}

impl MemorySessions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with a stored language.
    pub fn len(&self) -> usize {
        self.languages
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessions {
    fn language(&self, user_id: i64) -> Option<Language> {
        // A poisoned lock only means another task panicked mid-insert; the map is still usable.
        let map = self.languages.lock().unwrap_or_else(|e| e.into_inner());
        map.get(&user_id).copied()
    }

    fn set_language(&self, user_id: i64, lang: Language) {
        let mut map = self.languages.lock().unwrap_or_else(|e| e.into_inner());
        map.insert(user_id, lang);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store_has_no_language() {
        let store = MemorySessions::new();
        assert!(store.is_empty());
        assert_eq!(store.language(42), None);
    }

    #[test]
    fn test_set_then_get() {
        let store = MemorySessions::new();
        store.set_language(42, Language::Tr);
        assert_eq!(store.language(42), Some(Language::Tr));
        assert_eq!(store.language(43), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_replaces_previous_choice() {
        let store = MemorySessions::new();
        store.set_language(7, Language::Fr);
        store.set_language(7, Language::Ar);
        assert_eq!(store.language(7), Some(Language::Ar));
        assert_eq!(store.len(), 1);
    }
}
