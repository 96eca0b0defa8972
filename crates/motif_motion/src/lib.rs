//! Motif motion layer
//!
//! Frame-driven animation and observation primitives for Motif hosts:
//!
//! - **Easing** - the curve vocabulary shared by every effect
//! - **Scheduler** - the frame loop, tick callbacks, and one-shot timers
//! - **Counter** - eased numeric tweens for stat callouts
//! - **Tilt** - pointer-tracking 3D card tilt, magnetic pull, and the
//!   smoothed cursor-follow trail
//! - **Observer** - viewport intersection tracking, staggered reveals, and
//!   scroll parallax
//! - **Reveal** - letter/word reveal, typewriter, and scramble text effects
//!
//! Everything is stepped explicitly: hosts own a [`FrameScheduler`] (or call
//! each effect's `tick` directly) and pass deltas in milliseconds, so the
//! whole layer runs deterministically under a fake clock. Every effect holds
//! a [`MotionGate`](motif_core::MotionGate) clone and completes synchronously
//! when the host environment prefers reduced motion.

pub mod counter;
pub mod easing;
pub mod observer;
pub mod reveal;
pub mod scheduler;
pub mod tilt;

pub use counter::{CounterAnimation, CounterFormat, CounterOptions, VisibilityGatedCounter};
pub use easing::Easing;
pub use observer::{
    ObservationId, ObserveOptions, Parallax, StaggerGroup, Visibility, VisibilityObserver,
};
pub use reveal::{RevealMode, TextReveal, TextScramble, Typewriter};
pub use scheduler::{FrameScheduler, SchedulerHandle, TickCallbackId, TimerId};
pub use tilt::{CardTilt, CursorFollow, GlareState, MagneticPull, TiltConfig, TiltTransform};

// Re-export the core gate types alongside the effects that consume them
pub use motif_core::{MotionGate, MotionPreference};
