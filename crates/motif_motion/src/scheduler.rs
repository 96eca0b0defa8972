//! Frame scheduler
//!
//! The driving loop for all time-based motion. Hosts call
//! [`FrameScheduler::tick`] (wall clock) or [`FrameScheduler::advance`]
//! (explicit delta, for deterministic stepping) once per frame; the scheduler
//! runs every registered tick callback with the elapsed milliseconds and
//! fires any one-shot timers that have come due.
//!
//! Components never touch the scheduler directly. They hold a
//! [`SchedulerHandle`], a weak reference whose operations become no-ops once
//! the scheduler is gone, so a component outliving its scheduler degrades
//! silently instead of panicking.

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::sync::{Arc, Mutex, Weak};
use std::time::Instant;

new_key_type! {
    /// Handle to a registered per-frame tick callback
    pub struct TickCallbackId;

    /// Handle to a scheduled one-shot timer
    pub struct TimerId;
}

/// Per-frame callback. Receives the elapsed milliseconds since the previous
/// frame and returns `true` to stay registered, `false` when finished.
pub type TickCallback = Box<dyn FnMut(f32) -> bool + Send>;

struct Timer {
    remaining_ms: f32,
    callback: Option<Box<dyn FnOnce() + Send>>,
}

struct SchedulerInner {
    // Each tick callback sits behind its own Arc<Mutex> so the registry lock
    // is released while callbacks run. A callback may therefore register or
    // cancel work through a SchedulerHandle without deadlocking.
    ticks: Mutex<SlotMap<TickCallbackId, Arc<Mutex<TickCallback>>>>,
    timers: Mutex<SlotMap<TimerId, Timer>>,
}

/// Frame-driving scheduler
///
/// Owned by the host loop. All registered work stops when it is dropped.
pub struct FrameScheduler {
    inner: Arc<SchedulerInner>,
    last_frame: Option<Instant>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                ticks: Mutex::new(SlotMap::with_key()),
                timers: Mutex::new(SlotMap::with_key()),
            }),
            last_frame: None,
        }
    }

    /// A cloneable handle components use to register work
    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Drive one frame from the wall clock
    ///
    /// Measures the elapsed time since the previous call (zero on the first)
    /// and forwards it to [`FrameScheduler::advance`].
    pub fn tick(&mut self) -> bool {
        let now = Instant::now();
        let dt_ms = match self.last_frame {
            Some(prev) => now.duration_since(prev).as_secs_f32() * 1000.0,
            None => 0.0,
        };
        self.last_frame = Some(now);
        self.advance(dt_ms)
    }

    /// Drive one frame with an explicit delta in milliseconds
    ///
    /// Returns `true` while any tick callback or timer remains registered,
    /// letting hosts idle the loop when nothing is animating.
    pub fn advance(&mut self, dt_ms: f32) -> bool {
        self.run_ticks(dt_ms);
        self.run_timers(dt_ms);

        let has_ticks = !self.inner.ticks.lock().unwrap().is_empty();
        let has_timers = !self.inner.timers.lock().unwrap().is_empty();
        has_ticks || has_timers
    }

    fn run_ticks(&self, dt_ms: f32) {
        // Snapshot under the lock, run unlocked
        let entries: SmallVec<[(TickCallbackId, Arc<Mutex<TickCallback>>); 8]> = self
            .inner
            .ticks
            .lock()
            .unwrap()
            .iter()
            .map(|(id, cb)| (id, cb.clone()))
            .collect();

        let mut finished: SmallVec<[TickCallbackId; 8]> = SmallVec::new();
        for (id, callback) in entries {
            let keep = (*callback.lock().unwrap())(dt_ms);
            if !keep {
                finished.push(id);
            }
        }

        if !finished.is_empty() {
            let mut ticks = self.inner.ticks.lock().unwrap();
            for id in finished {
                ticks.remove(id);
            }
        }
    }

    fn run_timers(&self, dt_ms: f32) {
        let due: SmallVec<[Box<dyn FnOnce() + Send>; 4]> = {
            let mut timers = self.inner.timers.lock().unwrap();
            let mut due_ids: SmallVec<[TimerId; 4]> = SmallVec::new();
            for (id, timer) in timers.iter_mut() {
                timer.remaining_ms -= dt_ms;
                if timer.remaining_ms <= 0.0 {
                    due_ids.push(id);
                }
            }
            due_ids
                .into_iter()
                .filter_map(|id| timers.remove(id).and_then(|t| t.callback))
                .collect()
        };

        for callback in due {
            callback();
        }
    }

    /// Number of registered tick callbacks
    pub fn tick_count(&self) -> usize {
        self.inner.ticks.lock().unwrap().len()
    }

    /// Number of pending timers
    pub fn timer_count(&self) -> usize {
        self.inner.timers.lock().unwrap().len()
    }
}

impl Default for FrameScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Weak handle to a [`FrameScheduler`]
///
/// Cheap to clone and safe to hold past the scheduler's lifetime; every
/// operation on a dead scheduler is a no-op.
#[derive(Clone)]
pub struct SchedulerHandle {
    inner: Weak<SchedulerInner>,
}

impl SchedulerHandle {
    /// A handle not connected to any scheduler; all operations no-op
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    /// Register a per-frame callback
    ///
    /// The callback runs every frame until it returns `false` or is removed.
    pub fn add_tick<F>(&self, callback: F) -> Option<TickCallbackId>
    where
        F: FnMut(f32) -> bool + Send + 'static,
    {
        let inner = self.inner.upgrade()?;
        let id = inner
            .ticks
            .lock()
            .unwrap()
            .insert(Arc::new(Mutex::new(Box::new(callback))));
        Some(id)
    }

    /// Remove a tick callback; unknown or already-finished ids are ignored
    pub fn remove_tick(&self, id: TickCallbackId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.ticks.lock().unwrap().remove(id);
        }
    }

    /// Schedule a one-shot callback after `delay_ms`
    ///
    /// A zero or negative delay fires on the next frame.
    pub fn schedule_timer<F>(&self, delay_ms: f32, callback: F) -> Option<TimerId>
    where
        F: FnOnce() + Send + 'static,
    {
        let inner = self.inner.upgrade()?;
        let id = inner.timers.lock().unwrap().insert(Timer {
            remaining_ms: delay_ms,
            callback: Some(Box::new(callback)),
        });
        tracing::debug!(?id, delay_ms, "timer scheduled");
        Some(id)
    }

    /// Cancel a pending timer; unknown or already-fired ids are ignored
    pub fn cancel_timer(&self, id: TimerId) {
        if let Some(inner) = self.inner.upgrade() {
            inner.timers.lock().unwrap().remove(id);
        }
    }

    /// Whether the scheduler is still alive
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_tick_runs_until_finished() {
        let mut scheduler = FrameScheduler::new();
        let handle = scheduler.handle();

        let frames = Arc::new(AtomicUsize::new(0));
        let frames_clone = frames.clone();
        handle.add_tick(move |_dt| {
            let n = frames_clone.fetch_add(1, Ordering::SeqCst) + 1;
            n < 3
        });

        assert!(scheduler.advance(16.0));
        assert!(scheduler.advance(16.0));
        // Third run returns false; nothing remains
        assert!(!scheduler.advance(16.0));
        assert_eq!(frames.load(Ordering::SeqCst), 3);
        assert_eq!(scheduler.tick_count(), 0);

        // No further calls
        scheduler.advance(16.0);
        assert_eq!(frames.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_remove_tick() {
        let mut scheduler = FrameScheduler::new();
        let handle = scheduler.handle();

        let frames = Arc::new(AtomicUsize::new(0));
        let frames_clone = frames.clone();
        let id = handle
            .add_tick(move |_dt| {
                frames_clone.fetch_add(1, Ordering::SeqCst);
                true
            })
            .unwrap();

        scheduler.advance(16.0);
        handle.remove_tick(id);
        handle.remove_tick(id); // double removal is a no-op
        scheduler.advance(16.0);
        assert_eq!(frames.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_timer_fires_once_after_delay() {
        let mut scheduler = FrameScheduler::new();
        let handle = scheduler.handle();

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        handle.schedule_timer(100.0, move || {
            fired_clone.fetch_add(1, Ordering::SeqCst);
        });

        scheduler.advance(50.0);
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        scheduler.advance(50.0);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.timer_count(), 0);

        scheduler.advance(200.0);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_cancel_timer() {
        let mut scheduler = FrameScheduler::new();
        let handle = scheduler.handle();

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        let id = handle
            .schedule_timer(50.0, move || {
                fired_clone.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();

        handle.cancel_timer(id);
        scheduler.advance(100.0);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_callback_may_reenter_handle() {
        let mut scheduler = FrameScheduler::new();
        let handle = scheduler.handle();

        let fired = Arc::new(AtomicUsize::new(0));
        let fired_clone = fired.clone();
        let reentrant = handle.clone();
        handle.add_tick(move |_dt| {
            let fired_inner = fired_clone.clone();
            // Scheduling from inside a tick must not deadlock
            reentrant.schedule_timer(0.0, move || {
                fired_inner.fetch_add(1, Ordering::SeqCst);
            });
            false
        });

        scheduler.advance(16.0);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_handle_outlives_scheduler() {
        let handle = {
            let scheduler = FrameScheduler::new();
            scheduler.handle()
        };
        assert!(!handle.is_alive());
        assert!(handle.add_tick(|_| true).is_none());
        assert!(handle.schedule_timer(10.0, || {}).is_none());
    }

    #[test]
    fn test_wall_clock_tick_first_frame_is_zero_delta() {
        let mut scheduler = FrameScheduler::new();
        let handle = scheduler.handle();

        let last_dt = Arc::new(Mutex::new(None::<f32>));
        let last_dt_clone = last_dt.clone();
        handle.add_tick(move |dt| {
            *last_dt_clone.lock().unwrap() = Some(dt);
            true
        });

        scheduler.tick();
        assert_eq!(*last_dt.lock().unwrap(), Some(0.0));
    }
}
