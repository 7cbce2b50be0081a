//! Runtime API-key snapshots.
//!
//! Keys can be updated at runtime (persisted rows override environment
//! values), but consumers never see a live mutable map: they take an
//! immutable [`ApiKeys`] snapshot and keep using it for the duration of one
//! job. A reload builds a fresh snapshot and swaps it atomically.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Key names recognized by the store. Rows with other names are ignored.
pub const SOURCE_API_TOKEN: &str = "SOURCE_API_TOKEN";
pub const ANALYSIS_API_KEY: &str = "ANALYSIS_API_KEY";
pub const TRANSLATION_API_KEY: &str = "TRANSLATION_API_KEY";

pub const KNOWN_KEYS: [&str; 3] = [SOURCE_API_TOKEN, ANALYSIS_API_KEY, TRANSLATION_API_KEY];

/// One immutable snapshot of every credential the pipeline uses.
///
/// Empty string means "not configured"; callers that need a key decide
/// whether that is fatal (analysis) or a soft skip (translation).
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKeys {
    pub source_api_token: String,
    pub analysis_api_key: String,
    pub translation_api_key: String,
}

impl ApiKeys {
    /// Build a snapshot from environment variables only.
    #[must_use]
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).unwrap_or_default();
        Self {
            source_api_token: read(SOURCE_API_TOKEN),
            analysis_api_key: read(ANALYSIS_API_KEY),
            translation_api_key: read(TRANSLATION_API_KEY),
        }
    }

    /// Build a snapshot from environment variables, overridden by the given
    /// persisted rows. Empty row values are ignored so an accidental blank
    /// write never masks an environment fallback.
    #[must_use]
    pub fn from_env_with_overrides<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut snapshot = Self::from_env();
        let overrides: HashMap<String, String> = rows
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .collect();
        if let Some(v) = overrides.get(SOURCE_API_TOKEN) {
            snapshot.source_api_token.clone_from(v);
        }
        if let Some(v) = overrides.get(ANALYSIS_API_KEY) {
            snapshot.analysis_api_key.clone_from(v);
        }
        if let Some(v) = overrides.get(TRANSLATION_API_KEY) {
            snapshot.translation_api_key.clone_from(v);
        }
        snapshot
    }
}

impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let set = |v: &str| if v.is_empty() { "unset" } else { "[redacted]" };
        f.debug_struct("ApiKeys")
            .field("source_api_token", &set(&self.source_api_token))
            .field("analysis_api_key", &set(&self.analysis_api_key))
            .field("translation_api_key", &set(&self.translation_api_key))
            .finish()
    }
}

/// Holder for the current [`ApiKeys`] snapshot.
///
/// `current()` is cheap (one `Arc` clone under a read lock); `swap()`
/// replaces the snapshot for all future readers without disturbing jobs
/// already holding the previous one.
pub struct KeyStore {
    inner: RwLock<Arc<ApiKeys>>,
}

impl KeyStore {
    #[must_use]
    pub fn new(initial: ApiKeys) -> Self {
        Self {
            inner: RwLock::new(Arc::new(initial)),
        }
    }

    /// The current snapshot. Never blocks writers for longer than the clone.
    #[must_use]
    pub fn current(&self) -> Arc<ApiKeys> {
        match self.inner.read() {
            Ok(guard) => Arc::clone(&guard),
            // A poisoned lock still holds a valid snapshot.
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Install a new snapshot for all future readers.
    pub fn swap(&self, next: ApiKeys) {
        match self.inner.write() {
            Ok(mut guard) => *guard = Arc::new(next),
            Err(poisoned) => *poisoned.into_inner() = Arc::new(next),
        }
    }
}

impl Default for KeyStore {
    fn default() -> Self {
        Self::new(ApiKeys::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_env_values() {
        let keys = ApiKeys::from_env_with_overrides(vec![(
            SOURCE_API_TOKEN.to_string(),
            "tok-from-db".to_string(),
        )]);
        assert_eq!(keys.source_api_token, "tok-from-db");
    }

    #[test]
    fn empty_override_is_ignored() {
        let base = ApiKeys::from_env();
        let keys = ApiKeys::from_env_with_overrides(vec![(
            ANALYSIS_API_KEY.to_string(),
            String::new(),
        )]);
        assert_eq!(keys.analysis_api_key, base.analysis_api_key);
    }

    #[test]
    fn unknown_row_names_are_ignored() {
        let keys = ApiKeys::from_env_with_overrides(vec![(
            "SOME_OTHER_KEY".to_string(),
            "value".to_string(),
        )]);
        assert_eq!(keys, ApiKeys::from_env());
    }

    #[test]
    fn swap_replaces_snapshot_for_future_readers() {
        let store = KeyStore::default();
        let before = store.current();
        assert!(before.source_api_token.is_empty());

        store.swap(ApiKeys {
            source_api_token: "fresh".to_string(),
            ..ApiKeys::default()
        });

        // The old snapshot is untouched; new readers see the replacement.
        assert!(before.source_api_token.is_empty());
        assert_eq!(store.current().source_api_token, "fresh");
    }

    #[test]
    fn debug_never_prints_key_material() {
        let keys = ApiKeys {
            source_api_token: "super-secret".to_string(),
            ..ApiKeys::default()
        };
        let rendered = format!("{keys:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[redacted]"));
        assert!(rendered.contains("unset"));
    }
}
