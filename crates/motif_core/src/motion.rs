//! Motion preference gate
//!
//! A shared, reactive signal carrying the host environment's "prefers reduced
//! motion" accessibility setting. Every animated component holds a clone of
//! the gate and queries it twice: once at activation and once at the moment a
//! run would start. The gate is never cached beyond a single run, so a
//! preference change mid-run leaves the run in flight untouched but gates the
//! next one.
//!
//! # Example
//!
//! ```rust
//! use motif_core::{MotionGate, MotionPreference};
//!
//! let gate = MotionGate::new();
//!
//! let sub = gate.subscribe(|pref| {
//!     // react to the environment signal changing
//!     let _ = pref;
//! });
//!
//! gate.set_preference(MotionPreference::Reduced);
//! assert!(gate.prefers_reduced());
//! drop(sub); // releases the subscription
//! ```

use slotmap::{new_key_type, SlotMap};
use std::sync::{Arc, RwLock, Weak};

new_key_type! {
    /// Handle to a registered gate subscriber
    pub struct GateSubscriptionId;
}

/// The host environment's motion preference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MotionPreference {
    /// Animations run normally
    #[default]
    Normal,
    /// Animations must produce their end state immediately, skipping
    /// intermediate frames
    Reduced,
}

type GateCallback = Arc<dyn Fn(MotionPreference) + Send + Sync>;

struct GateInner {
    preference: RwLock<MotionPreference>,
    subscribers: RwLock<SlotMap<GateSubscriptionId, GateCallback>>,
}

/// Shared motion preference gate
///
/// Cheap to clone; all clones observe the same preference. The host
/// environment owns one clone and pushes accessibility changes through
/// [`MotionGate::set_preference`]; components hold their own clone and read
/// it at run start.
#[derive(Clone)]
pub struct MotionGate {
    inner: Arc<GateInner>,
}

impl MotionGate {
    /// Create a gate reporting normal motion
    pub fn new() -> Self {
        Self::with_preference(MotionPreference::Normal)
    }

    /// Create a gate with an explicit initial preference
    pub fn with_preference(preference: MotionPreference) -> Self {
        Self {
            inner: Arc::new(GateInner {
                preference: RwLock::new(preference),
                subscribers: RwLock::new(SlotMap::with_key()),
            }),
        }
    }

    /// The current preference
    pub fn preference(&self) -> MotionPreference {
        *self.inner.preference.read().unwrap()
    }

    /// Whether the host requested reduced motion
    pub fn prefers_reduced(&self) -> bool {
        self.preference() == MotionPreference::Reduced
    }

    /// Push a new preference from the host environment
    ///
    /// Subscribers are notified only when the value actually changes.
    pub fn set_preference(&self, preference: MotionPreference) {
        {
            let mut current = self
                .inner
                .preference
                .write()
                .unwrap();
            if *current == preference {
                return;
            }
            *current = preference;
        }

        tracing::debug!(?preference, "motion preference changed");

        // Snapshot under the lock, invoke unlocked: a callback may
        // subscribe or unsubscribe without deadlocking
        let callbacks: Vec<GateCallback> = self
            .inner
            .subscribers
            .read()
            .unwrap()
            .values()
            .cloned()
            .collect();
        for callback in callbacks {
            callback(preference);
        }
    }

    /// Subscribe to preference changes
    ///
    /// The callback fires on every change (not on same-value sets). Dropping
    /// the returned handle releases the subscription; explicit
    /// [`GateSubscription::unsubscribe`] is idempotent.
    pub fn subscribe<F>(&self, callback: F) -> GateSubscription
    where
        F: Fn(MotionPreference) + Send + Sync + 'static,
    {
        let id = self
            .inner
            .subscribers
            .write()
            .unwrap()
            .insert(Arc::new(callback));

        GateSubscription {
            inner: Arc::downgrade(&self.inner),
            id: Some(id),
        }
    }

    /// Number of live subscriptions
    pub fn subscriber_count(&self) -> usize {
        self.inner
            .subscribers
            .read()
            .unwrap()
            .len()
    }
}

impl Default for MotionGate {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a gate subscription
///
/// Releases the subscription on drop. Won't keep the gate alive.
pub struct GateSubscription {
    inner: Weak<GateInner>,
    id: Option<GateSubscriptionId>,
}

impl GateSubscription {
    /// Release the subscription
    ///
    /// Safe to call more than once; releasing after the gate is gone is a
    /// no-op.
    pub fn unsubscribe(&mut self) {
        if let (Some(id), Some(inner)) = (self.id.take(), self.inner.upgrade()) {
            inner
                .subscribers
                .write()
                .unwrap()
                .remove(id);
        }
    }
}

impl Drop for GateSubscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}
