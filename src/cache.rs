//! Per-user language preference cache.
//!
//! The workflow resolves the user's language once per incoming update. A
//! miss is never an error: it resolves to the configured fallback language,
//! and the profile store remains the durable source of truth.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::models::Language;

/// Read side of the preference cache, as seen by the workflow.
pub trait PreferenceCache: Send + Sync {
    fn get(&self, user_id: i64) -> Option<Language>;

    /// Refresh the cached preference after a profile update.
    fn set(&self, user_id: i64, lang: Language);
}

/// Process-local preference cache.
#[derive(Default)]
pub struct InMemoryPreferenceCache {
    entries: RwLock<HashMap<i64, Language>>,
}

impl InMemoryPreferenceCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceCache for InMemoryPreferenceCache {
    fn get(&self, user_id: i64) -> Option<Language> {
        self.entries
            .read()
            .ok()
            .and_then(|map| map.get(&user_id).copied())
    }

    fn set(&self, user_id: i64, lang: Language) {
        if let Ok(mut map) = self.entries.write() {
            map.insert(user_id, lang);
        }
    }
}
