//! Loading-state guard
//!
//! A shared tracker for "something is in flight" UI state, plus a guarded
//! execution wrapper with the catch-and-record contract: any failure from a
//! wrapped operation is recorded and the tracker always transitions back to
//! not-loading. Callers treat a failure as "loading ended, result
//! unavailable", never as a crash.

use std::fmt::Display;
use std::sync::{Arc, Mutex};

/// Visual style hint for the host's loading indicator
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Indicator {
    #[default]
    Spinner,
    Pulse,
    Dots,
    Skeleton,
}

/// Snapshot of the tracker's state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LoadingSnapshot {
    pub is_loading: bool,
    pub message: Option<String>,
    pub indicator: Indicator,
}

struct TrackerInner {
    snapshot: LoadingSnapshot,
    last_error: Option<String>,
}

/// Shared loading tracker
///
/// Cheap to clone; all clones observe the same state.
#[derive(Clone)]
pub struct LoadingTracker {
    inner: Arc<Mutex<TrackerInner>>,
}

impl LoadingTracker {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(TrackerInner {
                snapshot: LoadingSnapshot::default(),
                last_error: None,
            })),
        }
    }

    /// Enter the loading state
    pub fn start(&self, message: Option<&str>, indicator: Indicator) {
        let mut inner = self.inner.lock().unwrap();
        inner.snapshot = LoadingSnapshot {
            is_loading: true,
            message: message.map(str::to_string),
            indicator,
        };
    }

    /// Leave the loading state
    pub fn stop(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.snapshot = LoadingSnapshot::default();
    }

    /// Replace the message while loading
    pub fn set_message(&self, message: impl Into<String>) {
        self.inner.lock().unwrap().snapshot.message = Some(message.into());
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().unwrap().snapshot.is_loading
    }

    pub fn snapshot(&self) -> LoadingSnapshot {
        self.inner.lock().unwrap().snapshot.clone()
    }

    /// The error recorded by the most recent failed [`LoadingTracker::guarded`]
    /// call, cleared on the next guarded run
    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().unwrap().last_error.clone()
    }

    /// Run a fallible operation under the tracker
    ///
    /// Enters the loading state, runs the closure, and always returns to
    /// not-loading. On failure the error is recorded and `None` is returned.
    pub fn guarded<T, E, F>(&self, message: Option<&str>, f: F) -> Option<T>
    where
        F: FnOnce() -> Result<T, E>,
        E: Display,
    {
        self.inner.lock().unwrap().last_error = None;
        self.start(message, Indicator::Spinner);

        let result = f();

        match result {
            Ok(value) => {
                self.stop();
                Some(value)
            }
            Err(err) => {
                tracing::debug!(%err, "guarded operation failed");
                self.inner.lock().unwrap().last_error = Some(err.to_string());
                self.stop();
                None
            }
        }
    }
}

impl Default for LoadingTracker {
    fn default() -> Self {
        Self::new()
    }
}
