//! Visibility observation
//!
//! Tracks which registered element rectangles intersect a viewport and fires
//! enter/leave callbacks when an element crosses its visibility threshold.
//! Built on top of it: staggered reveal groups, which trigger child callbacks
//! at fixed intervals once their container becomes visible, and a scroll
//! parallax mapping.
//!
//! The observer is pull-based: hosts push layout changes through
//! [`VisibilityObserver::set_viewport`] and
//! [`VisibilityObserver::update_bounds`], then call
//! [`VisibilityObserver::evaluate`] when a frame's layout has settled.

use crate::scheduler::SchedulerHandle;
use motif_core::Rect;
use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::sync::{Arc, Mutex};

new_key_type! {
    /// Handle to a registered observation
    pub struct ObservationId;
}

/// A visibility transition reported to a callback
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    /// The element's intersection ratio reached its threshold
    Entered,
    /// The ratio fell back below the threshold
    Left,
}

/// Per-observation parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ObserveOptions {
    /// Fraction of the element's area that must intersect the viewport,
    /// in [0, 1]. A zero threshold fires on any overlap.
    pub threshold: f32,
    /// Margin added around the viewport before intersection is computed,
    /// pixels. Positive margins fire callbacks early.
    pub root_margin: f32,
    /// Report only the first entry, then drop the observation
    pub once: bool,
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: 0.0,
            once: false,
        }
    }
}

type VisibilityCallback = Box<dyn FnMut(Visibility, f32) + Send>;

struct Observation {
    bounds: Rect,
    options: ObserveOptions,
    callback: VisibilityCallback,
    visible: bool,
}

/// Viewport intersection tracker
pub struct VisibilityObserver {
    viewport: Rect,
    observations: SlotMap<ObservationId, Observation>,
}

impl VisibilityObserver {
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            observations: SlotMap::with_key(),
        }
    }

    /// Register an element
    ///
    /// The callback receives the transition and the intersection ratio at
    /// evaluation time. No callback fires until the next
    /// [`VisibilityObserver::evaluate`].
    pub fn observe<F>(&mut self, bounds: Rect, options: ObserveOptions, callback: F) -> ObservationId
    where
        F: FnMut(Visibility, f32) + Send + 'static,
    {
        self.observations.insert(Observation {
            bounds,
            options,
            callback: Box::new(callback),
            visible: false,
        })
    }

    /// Stop observing; unknown ids are ignored
    pub fn unobserve(&mut self, id: ObservationId) {
        self.observations.remove(id);
    }

    /// Replace the viewport rectangle
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// Update an element's bounds after a layout change
    pub fn update_bounds(&mut self, id: ObservationId, bounds: Rect) {
        if let Some(observation) = self.observations.get_mut(id) {
            observation.bounds = bounds;
        }
    }

    pub fn observation_count(&self) -> usize {
        self.observations.len()
    }

    /// Recompute every observation and fire callbacks for crossings
    pub fn evaluate(&mut self) {
        let viewport = self.viewport;
        let mut finished: SmallVec<[ObservationId; 4]> = SmallVec::new();

        for (id, observation) in self.observations.iter_mut() {
            let root = viewport.expand(observation.options.root_margin);
            let ratio = intersection_ratio(&observation.bounds, &root);
            let above = meets_threshold(ratio, observation.options.threshold);

            if above && !observation.visible {
                observation.visible = true;
                (observation.callback)(Visibility::Entered, ratio);
                if observation.options.once {
                    finished.push(id);
                }
            } else if !above && observation.visible {
                observation.visible = false;
                (observation.callback)(Visibility::Left, ratio);
            }
        }

        for id in finished {
            tracing::debug!(?id, "one-shot observation complete");
            self.observations.remove(id);
        }
    }
}

/// Fraction of `element` covered by `root`, in [0, 1]
fn intersection_ratio(element: &Rect, root: &Rect) -> f32 {
    let area = element.area();
    if area <= 0.0 {
        return 0.0;
    }
    match element.intersection(root) {
        Some(overlap) => (overlap.area() / area).clamp(0.0, 1.0),
        None => 0.0,
    }
}

fn meets_threshold(ratio: f32, threshold: f32) -> bool {
    if threshold <= 0.0 {
        ratio > 0.0
    } else {
        ratio >= threshold
    }
}

/// Staggered reveal group
///
/// Observes a container; when the container first becomes visible, each
/// registered child callback is scheduled at `index * stagger_delay_ms`
/// through the frame scheduler, then the container observation is dropped.
pub struct StaggerGroup {
    scheduler: SchedulerHandle,
    stagger_delay_ms: f32,
    children: Arc<Mutex<Vec<Box<dyn FnOnce() + Send>>>>,
    observation: Option<ObservationId>,
    triggered: Arc<Mutex<bool>>,
}

impl StaggerGroup {
    pub fn new(scheduler: SchedulerHandle, stagger_delay_ms: f32) -> Self {
        Self {
            scheduler,
            stagger_delay_ms,
            children: Arc::new(Mutex::new(Vec::new())),
            observation: None,
            triggered: Arc::new(Mutex::new(false)),
        }
    }

    /// Register a child reveal; order of registration is the stagger order
    pub fn add_child<F>(&mut self, reveal: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.children.lock().unwrap().push(Box::new(reveal));
    }

    /// Attach the group to a container rectangle
    pub fn attach(
        &mut self,
        observer: &mut VisibilityObserver,
        container: Rect,
        threshold: f32,
    ) {
        let scheduler = self.scheduler.clone();
        let delay = self.stagger_delay_ms;
        let children = self.children.clone();
        let triggered = self.triggered.clone();

        let id = observer.observe(
            container,
            ObserveOptions {
                threshold,
                once: true,
                ..Default::default()
            },
            move |visibility, _ratio| {
                if visibility != Visibility::Entered {
                    return;
                }
                *triggered.lock().unwrap() = true;
                let pending: Vec<_> = children.lock().unwrap().drain(..).collect();
                for (index, reveal) in pending.into_iter().enumerate() {
                    scheduler.schedule_timer(index as f32 * delay, reveal);
                }
            },
        );
        self.observation = Some(id);
    }

    /// Stop watching the container before it has triggered
    pub fn detach(&mut self, observer: &mut VisibilityObserver) {
        if let Some(id) = self.observation.take() {
            observer.unobserve(id);
        }
    }

    pub fn has_triggered(&self) -> bool {
        *self.triggered.lock().unwrap()
    }
}

/// Scroll parallax mapping
///
/// Maps an element's travel through the viewport to a vertical offset. The
/// offset is zero when the element's travel is at its midpoint and grows
/// toward the edges, scaled by `speed`.
#[derive(Clone, Copy, Debug)]
pub struct Parallax {
    speed: f32,
}

impl Parallax {
    pub fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// Progress of the element through the viewport, in [0, 1]
    ///
    /// Zero when the element's top is at the bottom edge of the viewport,
    /// one when its bottom has passed the top edge.
    pub fn progress(&self, element_top: f32, element_height: f32, viewport_height: f32) -> f32 {
        let travel = viewport_height + element_height;
        if travel <= 0.0 {
            return 0.0;
        }
        ((viewport_height - element_top) / travel).clamp(0.0, 1.0)
    }

    /// Vertical offset for the current scroll position
    pub fn offset(&self, element_top: f32, element_height: f32, viewport_height: f32) -> f32 {
        let progress = self.progress(element_top, element_height, viewport_height);
        (progress - 0.5) * 100.0 * self.speed
    }
}
