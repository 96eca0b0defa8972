//! Animated numeric counter
//!
//! Tweens a displayed number from a start value toward a target over a fixed
//! duration with a configurable easing curve, for stat blocks and metric
//! callouts. Respects the motion gate: under reduced motion the counter jumps
//! straight to the target with no intermediate frames.
//!
//! [`VisibilityGatedCounter`] wraps a counter so it starts on first
//! visibility, the common "count up when scrolled into view" pattern.

use crate::easing::Easing;
use motif_core::MotionGate;

/// Display formatting for a counter value
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CounterFormat {
    /// Fractional digits to render
    pub decimals: usize,
    /// Text placed before the number, e.g. `"$"`
    pub prefix: String,
    /// Text placed after the number, e.g. `"%"` or `"+"`
    pub suffix: String,
}

impl CounterFormat {
    /// Render a value with this format
    pub fn render(&self, value: f64) -> String {
        format!(
            "{}{:.*}{}",
            self.prefix, self.decimals, value, self.suffix
        )
    }
}

/// Counter animation parameters
#[derive(Clone, Debug, PartialEq)]
pub struct CounterOptions {
    /// Total run time in milliseconds
    pub duration_ms: f32,
    /// Value shown before the run starts
    pub start_value: f64,
    pub easing: Easing,
    pub format: CounterFormat,
}

impl Default for CounterOptions {
    fn default() -> Self {
        Self {
            duration_ms: 2000.0,
            start_value: 0.0,
            easing: Easing::EaseOut,
            format: CounterFormat::default(),
        }
    }
}

enum Phase {
    Idle,
    Running { elapsed_ms: f32 },
    Complete,
}

/// Frame-driven counter animation
///
/// Stepped externally through [`CounterAnimation::tick`]; the counter never
/// schedules its own frames.
pub struct CounterAnimation {
    gate: MotionGate,
    target: f64,
    options: CounterOptions,
    value: f64,
    phase: Phase,
}

impl CounterAnimation {
    pub fn new(gate: MotionGate, target: f64, options: CounterOptions) -> Self {
        let value = options.start_value;
        Self {
            gate,
            target,
            options,
            value,
            phase: Phase::Idle,
        }
    }

    /// Begin the run
    ///
    /// Idempotent while running. Under reduced motion the counter completes
    /// synchronously at the target value.
    pub fn start(&mut self) {
        if matches!(self.phase, Phase::Running { .. }) {
            return;
        }

        if self.gate.prefers_reduced() {
            self.value = self.target;
            self.phase = Phase::Complete;
            return;
        }

        self.value = self.options.start_value;
        self.phase = Phase::Running { elapsed_ms: 0.0 };
    }

    /// Advance by `dt_ms` milliseconds
    ///
    /// Returns `true` while the run is in progress. The final frame lands
    /// exactly on the target.
    pub fn tick(&mut self, dt_ms: f32) -> bool {
        let elapsed = match &mut self.phase {
            Phase::Running { elapsed_ms } => {
                *elapsed_ms += dt_ms;
                *elapsed_ms
            }
            _ => return false,
        };

        let t = if self.options.duration_ms <= 0.0 {
            1.0
        } else {
            (elapsed / self.options.duration_ms).min(1.0)
        };

        if t >= 1.0 {
            self.value = self.target;
            self.phase = Phase::Complete;
            return false;
        }

        let progress = self.options.easing.apply(t) as f64;
        self.value = self.options.start_value + (self.target - self.options.start_value) * progress;
        true
    }

    /// The currently displayed value
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The value rendered with the configured format
    pub fn formatted(&self) -> String {
        self.options.format.render(self.value)
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_animating(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.phase, Phase::Complete)
    }
}

/// Counter that starts on first visibility
///
/// Hosts forward intersection ratios from their visibility source through
/// [`VisibilityGatedCounter::update_visibility`]; once the ratio reaches the
/// threshold the inner counter starts, and later visibility changes are
/// ignored.
pub struct VisibilityGatedCounter {
    counter: CounterAnimation,
    threshold: f32,
    triggered: bool,
}

impl VisibilityGatedCounter {
    pub fn new(counter: CounterAnimation) -> Self {
        Self::with_threshold(counter, 0.5)
    }

    pub fn with_threshold(counter: CounterAnimation, threshold: f32) -> Self {
        Self {
            counter,
            threshold,
            triggered: false,
        }
    }

    /// Feed a new intersection ratio in [0, 1]
    ///
    /// Starts the counter the first time the ratio reaches the threshold.
    pub fn update_visibility(&mut self, ratio: f32) {
        if self.triggered || ratio < self.threshold {
            return;
        }
        self.triggered = true;
        self.counter.start();
    }

    pub fn tick(&mut self, dt_ms: f32) -> bool {
        self.counter.tick(dt_ms)
    }

    pub fn counter(&self) -> &CounterAnimation {
        &self.counter
    }

    pub fn has_triggered(&self) -> bool {
        self.triggered
    }
}
