//! Preference store
//!
//! Persisted user preferences (language, theme, units) with a write-through
//! persistence mirror. The store itself is in-memory; every mutation is
//! mirrored to the host's key-value persistence (the browser's localStorage,
//! a config file, ...) through the [`PreferenceMirror`] trait, and
//! [`PreferenceStore::load`] hydrates from the mirror on startup, tolerating
//! absent or corrupt values.
//!
//! # Example
//!
//! ```rust
//! use motif_core::{MemoryMirror, PreferenceStore, Theme};
//!
//! let store = PreferenceStore::new(MemoryMirror::new());
//! store.set_theme(Theme::Dark);
//!
//! assert_eq!(store.theme(), Theme::Dark);
//! ```

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::sync::{Arc, RwLock, Weak};
use thiserror::Error;

new_key_type! {
    /// Handle to a registered store subscriber
    pub struct StoreSubscriptionId;
}

/// Mirror keys, matching the flat key-per-preference layout of the host store
const KEY_LANGUAGE: &str = "user_language";
const KEY_THEME: &str = "user_theme";
const KEY_UNITS: &str = "user_units";

/// Color theme preference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            "system" => Some(Theme::System),
            _ => None,
        }
    }
}

/// Measurement unit preference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "metric" => Some(Units::Metric),
            "imperial" => Some(Units::Imperial),
            _ => None,
        }
    }
}

/// The persisted preference set
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub language: String,
    pub theme: Theme,
    pub units: Units,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            theme: Theme::System,
            units: Units::Metric,
        }
    }
}

impl Preferences {
    /// Serialize to JSON for host bridging
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Parse from JSON, falling back to defaults on invalid input
    pub fn from_json(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|err| {
            tracing::warn!(%err, "invalid preferences payload, using defaults");
            Self::default()
        })
    }
}

/// Error from the persistence mirror
#[derive(Debug, Error)]
pub enum MirrorError {
    /// The host has no persistence available
    #[error("preference mirror unavailable")]
    Unavailable,
    /// The mirror rejected the write
    #[error("preference mirror write failed: {0}")]
    Write(String),
}

/// The localStorage-mirroring contract
///
/// `load` returns the persisted value for a key, if any. `save` writes a
/// value through; failures are reported but the in-memory store has already
/// been updated, so callers keep a consistent view either way.
pub trait PreferenceMirror: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str) -> Result<(), MirrorError>;
}

/// In-memory mirror for tests and hosts without persistence
pub struct MemoryMirror {
    values: RwLock<FxHashMap<String, String>>,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self {
            values: RwLock::new(FxHashMap::default()),
        }
    }

    /// Pre-seed a value, as if persisted by a previous session
    pub fn seed(&self, key: &str, value: &str) {
        self.values
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

impl Default for MemoryMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl PreferenceMirror for MemoryMirror {
    fn load(&self, key: &str) -> Option<String> {
        self.values.read().unwrap().get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) -> Result<(), MirrorError> {
        self.values
            .write()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

type StoreCallback = Arc<dyn Fn(&Preferences) + Send + Sync>;

struct StoreInner {
    state: RwLock<Preferences>,
    subscribers: RwLock<SlotMap<StoreSubscriptionId, StoreCallback>>,
    mirror: Box<dyn PreferenceMirror>,
}

/// Shared preference store
///
/// Cheap to clone; all clones observe the same state. Mutations write
/// through to the mirror and notify subscribers.
#[derive(Clone)]
pub struct PreferenceStore {
    inner: Arc<StoreInner>,
}

impl PreferenceStore {
    /// Create a store with default preferences backed by the given mirror
    pub fn new(mirror: impl PreferenceMirror + 'static) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                state: RwLock::new(Preferences::default()),
                subscribers: RwLock::new(SlotMap::with_key()),
                mirror: Box::new(mirror),
            }),
        }
    }

    /// Current preferences snapshot
    pub fn get(&self) -> Preferences {
        self.inner.state.read().unwrap().clone()
    }

    pub fn language(&self) -> String {
        self.inner.state.read().unwrap().language.clone()
    }

    pub fn theme(&self) -> Theme {
        self.inner.state.read().unwrap().theme
    }

    pub fn units(&self) -> Units {
        self.inner.state.read().unwrap().units
    }

    pub fn is_metric(&self) -> bool {
        self.units() == Units::Metric
    }

    pub fn set_language(&self, language: impl Into<String>) {
        let language = language.into();
        self.update(|prefs| prefs.language = language.clone());
        self.mirror_save(KEY_LANGUAGE, &language);
    }

    pub fn set_theme(&self, theme: Theme) {
        self.update(|prefs| prefs.theme = theme);
        self.mirror_save(KEY_THEME, theme.as_str());
    }

    pub fn set_units(&self, units: Units) {
        self.update(|prefs| prefs.units = units);
        self.mirror_save(KEY_UNITS, units.as_str());
    }

    /// Update preferences with a closure and notify subscribers
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Preferences),
    {
        let snapshot = {
            let mut state = self.inner.state.write().unwrap();
            f(&mut state);
            state.clone()
        };
        self.notify(&snapshot);
    }

    /// Hydrate from the mirror
    ///
    /// Absent keys keep their defaults; unrecognized persisted values are
    /// logged and skipped. Never fails the caller.
    pub fn load(&self) {
        let mut state = self.inner.state.write().unwrap();

        if let Some(language) = self.inner.mirror.load(KEY_LANGUAGE) {
            if !language.is_empty() {
                state.language = language;
            }
        }

        if let Some(raw) = self.inner.mirror.load(KEY_THEME) {
            match Theme::parse(&raw) {
                Some(theme) => state.theme = theme,
                None => tracing::warn!(value = %raw, "ignoring unrecognized persisted theme"),
            }
        }

        if let Some(raw) = self.inner.mirror.load(KEY_UNITS) {
            match Units::parse(&raw) {
                Some(units) => state.units = units,
                None => tracing::warn!(value = %raw, "ignoring unrecognized persisted units"),
            }
        }

        let snapshot = state.clone();
        drop(state);
        self.notify(&snapshot);
    }

    /// Subscribe to preference changes
    ///
    /// Dropping the returned handle releases the subscription.
    pub fn subscribe<F>(&self, callback: F) -> StoreSubscription
    where
        F: Fn(&Preferences) + Send + Sync + 'static,
    {
        let id = self
            .inner
            .subscribers
            .write()
            .unwrap()
            .insert(Arc::new(callback));

        StoreSubscription {
            inner: Arc::downgrade(&self.inner),
            id: Some(id),
        }
    }

    fn mirror_save(&self, key: &str, value: &str) {
        if let Err(err) = self.inner.mirror.save(key, value) {
            tracing::warn!(key, %err, "preference mirror write failed");
        }
    }

    fn notify(&self, snapshot: &Preferences) {
        // Snapshot under the lock, invoke unlocked: a callback may
        // subscribe or unsubscribe without deadlocking
        let callbacks: Vec<StoreCallback> = self
            .inner
            .subscribers
            .read()
            .unwrap()
            .values()
            .cloned()
            .collect();
        for callback in callbacks {
            callback(snapshot);
        }
    }
}

/// Handle to a store subscription
///
/// Releases the subscription on drop. Won't keep the store alive.
pub struct StoreSubscription {
    inner: Weak<StoreInner>,
    id: Option<StoreSubscriptionId>,
}

impl StoreSubscription {
    /// Release the subscription; safe to call more than once
    pub fn unsubscribe(&mut self) {
        if let (Some(id), Some(inner)) = (self.id.take(), self.inner.upgrade()) {
            inner.subscribers.write().unwrap().remove(id);
        }
    }
}

impl Drop for StoreSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_defaults() {
        let store = PreferenceStore::new(MemoryMirror::new());
        let prefs = store.get();
        assert_eq!(prefs.language, "en");
        assert_eq!(prefs.theme, Theme::System);
        assert_eq!(prefs.units, Units::Metric);
        assert!(store.is_metric());
    }

    #[test]
    fn test_set_writes_through_to_mirror() {
        let mirror = MemoryMirror::new();
        let store = PreferenceStore::new(mirror);

        store.set_language("da");
        store.set_theme(Theme::Dark);
        store.set_units(Units::Imperial);

        assert_eq!(store.language(), "da");
        assert_eq!(store.theme(), Theme::Dark);
        assert!(!store.is_metric());

        // A second store over the same mirror would see the persisted values;
        // verify via hydration round trip instead (mirror moved into store).
        let mirror = MemoryMirror::new();
        mirror.seed(KEY_LANGUAGE, "da");
        mirror.seed(KEY_THEME, "dark");
        mirror.seed(KEY_UNITS, "imperial");
        let restored = PreferenceStore::new(mirror);
        restored.load();
        assert_eq!(restored.get().theme, Theme::Dark);
        assert_eq!(restored.get().units, Units::Imperial);
        assert_eq!(restored.language(), "da");
    }

    #[test]
    fn test_load_tolerates_corrupt_values() {
        let mirror = MemoryMirror::new();
        mirror.seed(KEY_THEME, "neon");
        mirror.seed(KEY_UNITS, "furlongs");
        mirror.seed(KEY_LANGUAGE, "");

        let store = PreferenceStore::new(mirror);
        store.load();

        // Corrupt values fall back to defaults
        let prefs = store.get();
        assert_eq!(prefs.theme, Theme::System);
        assert_eq!(prefs.units, Units::Metric);
        assert_eq!(prefs.language, "en");
    }

    #[test]
    fn test_subscriber_notified_on_set() {
        let store = PreferenceStore::new(MemoryMirror::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let calls_clone = calls.clone();

        let mut sub = store.subscribe(move |prefs| {
            assert!(!prefs.language.is_empty());
            calls_clone.fetch_add(1, Ordering::SeqCst);
        });

        store.set_language("da");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        sub.unsubscribe();
        sub.unsubscribe();
        store.set_theme(Theme::Light);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unsubscribe_inside_callback_does_not_deadlock() {
        let store = PreferenceStore::new(MemoryMirror::new());
        let slot: Arc<std::sync::Mutex<Option<StoreSubscription>>> =
            Arc::new(std::sync::Mutex::new(None));
        let slot_clone = slot.clone();

        let sub = store.subscribe(move |_| {
            // A subscriber releasing itself mid-notification must not block
            if let Some(mut sub) = slot_clone.lock().unwrap().take() {
                sub.unsubscribe();
            }
        });
        *slot.lock().unwrap() = Some(sub);

        store.set_theme(Theme::Dark);
        assert_eq!(store.theme(), Theme::Dark);

        // Already released; further sets notify nobody
        store.set_theme(Theme::Light);
    }

    #[test]
    fn test_memory_updated_even_when_mirror_write_fails() {
        struct BrokenMirror;

        impl PreferenceMirror for BrokenMirror {
            fn load(&self, _key: &str) -> Option<String> {
                None
            }
            fn save(&self, _key: &str, _value: &str) -> Result<(), MirrorError> {
                Err(MirrorError::Unavailable)
            }
        }

        let store = PreferenceStore::new(BrokenMirror);
        store.set_theme(Theme::Dark);
        store.set_units(Units::Imperial);

        // In-memory state is updated before the mirror write is attempted
        assert_eq!(store.theme(), Theme::Dark);
        assert_eq!(store.units(), Units::Imperial);
    }

    #[test]
    fn test_json_round_trip() {
        let prefs = Preferences {
            language: "da".into(),
            theme: Theme::Dark,
            units: Units::Imperial,
        };
        let restored = Preferences::from_json(&prefs.to_json());
        assert_eq!(restored, prefs);

        // Invalid payloads fall back to defaults
        assert_eq!(Preferences::from_json("not json"), Preferences::default());
    }
}
