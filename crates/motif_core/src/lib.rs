//! Motif Core
//!
//! This crate provides the foundational primitives for the Motif motion
//! toolkit:
//!
//! - **Geometry**: points, sizes, rectangles and vectors used by the
//!   pointer-tracking and visibility layers
//! - **Motion Preference Gate**: a shared, reactive "prefers reduced motion"
//!   signal that every animated component consults before starting a run
//! - **Preference Store**: language/theme/units preferences with a
//!   write-through persistence mirror
//! - **Loading Guard**: catch-and-record wrapper for fallible operations
//!
//! # Example
//!
//! ```rust
//! use motif_core::{MotionGate, MotionPreference};
//!
//! let gate = MotionGate::new();
//! assert!(!gate.prefers_reduced());
//!
//! // The host environment pushes accessibility changes into the gate
//! gate.set_preference(MotionPreference::Reduced);
//! assert!(gate.prefers_reduced());
//! ```

pub mod geometry;
pub mod loading;
pub mod motion;
pub mod store;

pub use geometry::{Point, Rect, Size, Vec2};
pub use loading::{Indicator, LoadingSnapshot, LoadingTracker};
pub use motion::{GateSubscription, MotionGate, MotionPreference};
pub use store::{
    MemoryMirror, MirrorError, PreferenceMirror, PreferenceStore, Preferences, StoreSubscription,
    Theme, Units,
};
