//! Pointer-tracking transforms
//!
//! 3D card tilt that follows the pointer across an element's bounds, with an
//! optional glare highlight and device-orientation steering, a magnetic pull
//! that eases an element toward a nearby pointer, and a smoothed cursor
//! trail. All honor the motion gate: under reduced motion every query
//! reports the neutral or snapped state.

use motif_core::{MotionGate, Point, Rect, Vec2};

/// Card tilt parameters
#[derive(Clone, Debug, PartialEq)]
pub struct TiltConfig {
    /// Maximum rotation on either axis, degrees
    pub max_tilt: f32,
    /// Perspective distance for the 3D projection, pixels
    pub perspective: f32,
    /// Scale applied while the pointer hovers the card
    pub hover_scale: f32,
    /// Transition duration hint for the host's interpolation, milliseconds
    pub transition_ms: f32,
    /// Whether to report a glare highlight following the pointer
    pub glare: bool,
    /// Whether device orientation may steer the tilt while hovered
    pub gyroscope: bool,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            max_tilt: 10.0,
            perspective: 1000.0,
            hover_scale: 1.05,
            transition_ms: 400.0,
            glare: true,
            gyroscope: false,
        }
    }
}

impl TiltConfig {
    /// A gentler preset for dense layouts
    pub fn subtle() -> Self {
        Self {
            max_tilt: 8.0,
            hover_scale: 1.03,
            transition_ms: 300.0,
            ..Default::default()
        }
    }
}

/// The transform a host should apply to the card
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TiltTransform {
    pub perspective: f32,
    /// Rotation around the horizontal axis, degrees
    pub tilt_x: f32,
    /// Rotation around the vertical axis, degrees
    pub tilt_y: f32,
    pub scale: f32,
    pub transition_ms: f32,
}

impl TiltTransform {
    /// Flat, unscaled card
    pub const NEUTRAL: Self = Self {
        perspective: 1000.0,
        tilt_x: 0.0,
        tilt_y: 0.0,
        scale: 1.0,
        transition_ms: 0.0,
    };
}

/// Glare highlight position and strength
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlareState {
    /// Horizontal position as a percentage of the card width
    pub x: f32,
    /// Vertical position as a percentage of the card height
    pub y: f32,
    pub opacity: f32,
}

impl GlareState {
    const HIDDEN: Self = Self {
        x: 50.0,
        y: 50.0,
        opacity: 0.0,
    };

    const ACTIVE_OPACITY: f32 = 0.3;
}

/// Pointer-following 3D card tilt
pub struct CardTilt {
    gate: MotionGate,
    config: TiltConfig,
    bounds: Rect,
    hovered: bool,
    tilt_x: f32,
    tilt_y: f32,
    glare: GlareState,
}

impl CardTilt {
    pub fn new(gate: MotionGate, config: TiltConfig) -> Self {
        Self {
            gate,
            config,
            bounds: Rect::ZERO,
            hovered: false,
            tilt_x: 0.0,
            tilt_y: 0.0,
            glare: GlareState::HIDDEN,
        }
    }

    /// Update the card's layout bounds
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn pointer_enter(&mut self) {
        self.hovered = true;
    }

    /// Pointer left the card; everything returns to neutral
    pub fn pointer_leave(&mut self) {
        self.hovered = false;
        self.tilt_x = 0.0;
        self.tilt_y = 0.0;
        self.glare = GlareState::HIDDEN;
    }

    /// Feed a pointer position in the same coordinate space as the bounds
    ///
    /// A position outside the bounds resets to neutral, same as a leave.
    pub fn pointer_move(&mut self, position: Point) {
        if self.bounds.width() <= 0.0 || self.bounds.height() <= 0.0 {
            return;
        }
        if !self.bounds.contains(position) {
            self.pointer_leave();
            return;
        }

        let center = self.bounds.center();
        let percent_x = (position.x - center.x) / (self.bounds.width() / 2.0);
        let percent_y = (position.y - center.y) / (self.bounds.height() / 2.0);

        self.tilt_x = -percent_y * self.config.max_tilt;
        self.tilt_y = percent_x * self.config.max_tilt;

        if self.config.glare {
            self.glare = GlareState {
                x: (position.x - self.bounds.x()) / self.bounds.width() * 100.0,
                y: (position.y - self.bounds.y()) / self.bounds.height() * 100.0,
                opacity: GlareState::ACTIVE_OPACITY,
            };
        }
    }

    /// Feed a device-orientation sample
    ///
    /// `beta` is front-back rotation and `gamma` left-right, both in degrees.
    /// Ignored unless the card is hovered and gyroscope steering is enabled.
    /// Neutral beta is 45 degrees, the angle of a held device.
    pub fn orientation(&mut self, beta: f32, gamma: f32) {
        if !self.hovered || !self.config.gyroscope {
            return;
        }

        self.tilt_x = ((beta - 45.0) / 45.0).clamp(-1.0, 1.0) * self.config.max_tilt;
        self.tilt_y = (gamma / 45.0).clamp(-1.0, 1.0) * self.config.max_tilt;
    }

    /// The transform the host should render
    pub fn transform(&self) -> TiltTransform {
        if self.gate.prefers_reduced() {
            return TiltTransform::NEUTRAL;
        }

        TiltTransform {
            perspective: self.config.perspective,
            tilt_x: self.tilt_x,
            tilt_y: self.tilt_y,
            scale: if self.hovered {
                self.config.hover_scale
            } else {
                1.0
            },
            transition_ms: self.config.transition_ms,
        }
    }

    /// The glare highlight the host should render
    pub fn glare(&self) -> GlareState {
        if self.gate.prefers_reduced() {
            return GlareState::HIDDEN;
        }
        self.glare
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }
}

/// Magnetic pull toward a nearby pointer
///
/// Within the pull radius the element is offset toward the pointer, strongest
/// at the center and fading to zero at the edge of the radius.
pub struct MagneticPull {
    gate: MotionGate,
    strength: f32,
    radius: f32,
    center: Point,
    offset: Vec2,
}

impl MagneticPull {
    pub fn new(gate: MotionGate) -> Self {
        Self::with_params(gate, 0.3, 100.0)
    }

    pub fn with_params(gate: MotionGate, strength: f32, radius: f32) -> Self {
        Self {
            gate,
            strength,
            radius,
            center: Point::ZERO,
            offset: Vec2::ZERO,
        }
    }

    /// Update the element's center in pointer coordinates
    pub fn set_center(&mut self, center: Point) {
        self.center = center;
    }

    /// Feed a pointer position
    pub fn pointer_move(&mut self, position: Point) {
        let delta = Vec2::new(position.x - self.center.x, position.y - self.center.y);
        let distance = delta.length();

        if distance >= self.radius {
            self.offset = Vec2::ZERO;
            return;
        }

        let pull = (1.0 - distance / self.radius) * self.strength;
        self.offset = delta.scale(pull);
    }

    /// Pointer left the tracked region; the element springs back
    pub fn pointer_leave(&mut self) {
        self.offset = Vec2::ZERO;
    }

    /// The offset the host should apply
    pub fn offset(&self) -> Vec2 {
        if self.gate.prefers_reduced() {
            return Vec2::ZERO;
        }
        self.offset
    }
}

/// Smoothed cursor-follow trail
///
/// A trailing element that chases the pointer: each frame the position moves
/// a fixed fraction of the remaining distance toward the latest sample, so
/// the trail eases in behind the cursor. Under reduced motion the position
/// snaps to the pointer with no trailing frames.
pub struct CursorFollow {
    gate: MotionGate,
    /// Fraction of the remaining distance covered per frame
    smoothing: f32,
    target: Point,
    position: Point,
}

impl CursorFollow {
    /// Distance below which the trail snaps onto the target
    const SNAP_DISTANCE: f32 = 0.5;

    pub fn new(gate: MotionGate) -> Self {
        Self::with_smoothing(gate, 0.15)
    }

    pub fn with_smoothing(gate: MotionGate, smoothing: f32) -> Self {
        Self {
            gate,
            smoothing,
            target: Point::ZERO,
            position: Point::ZERO,
        }
    }

    /// Feed the latest pointer position
    pub fn pointer_move(&mut self, position: Point) {
        self.target = position;
        if self.gate.prefers_reduced() {
            self.position = position;
        }
    }

    /// Advance one frame
    ///
    /// Returns `true` while the trail is still closing on the target. Under
    /// reduced motion the position is already at the target and no frames
    /// are needed.
    pub fn tick(&mut self) -> bool {
        if self.gate.prefers_reduced() {
            self.position = self.target;
            return false;
        }

        let dx = self.target.x - self.position.x;
        let dy = self.target.y - self.position.y;
        if (dx * dx + dy * dy).sqrt() < Self::SNAP_DISTANCE {
            self.position = self.target;
            return false;
        }

        self.position.x += dx * self.smoothing;
        self.position.y += dy * self.smoothing;
        true
    }

    /// The trail's current position
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn target(&self) -> Point {
        self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motif_core::MotionPreference;

    fn card() -> CardTilt {
        let mut tilt = CardTilt::new(MotionGate::new(), TiltConfig::default());
        tilt.set_bounds(Rect::new(100.0, 100.0, 200.0, 100.0));
        tilt.pointer_enter();
        tilt
    }

    #[test]
    fn test_center_produces_no_tilt() {
        let mut tilt = card();
        tilt.pointer_move(Point::new(200.0, 150.0));
        let t = tilt.transform();
        assert_eq!(t.tilt_x, 0.0);
        assert_eq!(t.tilt_y, 0.0);
        assert_eq!(t.scale, 1.05);
    }

    #[test]
    fn test_corner_produces_max_tilt() {
        let mut tilt = card();
        // Bottom-right corner: full positive percent on both axes
        tilt.pointer_move(Point::new(300.0, 200.0));
        let t = tilt.transform();
        assert!((t.tilt_x - -10.0).abs() < 1e-4);
        assert!((t.tilt_y - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_pointer_outside_bounds_resets_to_neutral() {
        let mut tilt = card();
        tilt.pointer_move(Point::new(300.0, 200.0));
        assert_ne!(tilt.transform().tilt_x, 0.0);

        tilt.pointer_move(Point::new(500.0, 500.0));
        let t = tilt.transform();
        assert_eq!(t.tilt_x, 0.0);
        assert_eq!(t.tilt_y, 0.0);
        assert_eq!(t.scale, 1.0);
    }

    #[test]
    fn test_leave_resets_to_neutral() {
        let mut tilt = card();
        tilt.pointer_move(Point::new(300.0, 200.0));
        tilt.pointer_leave();
        let t = tilt.transform();
        assert_eq!(t.tilt_x, 0.0);
        assert_eq!(t.tilt_y, 0.0);
        assert_eq!(t.scale, 1.0);
        assert_eq!(tilt.glare().opacity, 0.0);
    }

    #[test]
    fn test_glare_follows_pointer() {
        let mut tilt = card();
        tilt.pointer_move(Point::new(150.0, 125.0));
        let glare = tilt.glare();
        assert!((glare.x - 25.0).abs() < 1e-4);
        assert!((glare.y - 25.0).abs() < 1e-4);
        assert_eq!(glare.opacity, 0.3);
    }

    #[test]
    fn test_reduced_motion_reports_neutral() {
        let gate = MotionGate::with_preference(MotionPreference::Reduced);
        let mut tilt = CardTilt::new(gate, TiltConfig::default());
        tilt.set_bounds(Rect::new(0.0, 0.0, 100.0, 100.0));
        tilt.pointer_enter();
        tilt.pointer_move(Point::new(90.0, 90.0));
        assert_eq!(tilt.transform(), TiltTransform::NEUTRAL);
        assert_eq!(tilt.glare().opacity, 0.0);
    }

    #[test]
    fn test_orientation_requires_hover_and_gyroscope() {
        let mut tilt = CardTilt::new(
            MotionGate::new(),
            TiltConfig {
                gyroscope: true,
                ..Default::default()
            },
        );
        tilt.set_bounds(Rect::new(0.0, 0.0, 100.0, 100.0));

        // Not hovered: ignored
        tilt.orientation(90.0, 45.0);
        assert_eq!(tilt.transform().tilt_x, 0.0);

        tilt.pointer_enter();
        tilt.orientation(90.0, 45.0);
        let t = tilt.transform();
        assert!((t.tilt_x - 10.0).abs() < 1e-4);
        assert!((t.tilt_y - 10.0).abs() < 1e-4);

        // Neutral device angle
        tilt.orientation(45.0, 0.0);
        assert_eq!(tilt.transform().tilt_x, 0.0);
    }

    #[test]
    fn test_magnetic_pull_fades_with_distance() {
        let mut pull = MagneticPull::new(MotionGate::new());
        pull.set_center(Point::new(100.0, 100.0));

        // At the center: full strength but zero distance, no offset
        pull.pointer_move(Point::new(100.0, 100.0));
        assert_eq!(pull.offset(), Vec2::ZERO);

        // Halfway out: offset = delta * 0.5 * strength
        pull.pointer_move(Point::new(150.0, 100.0));
        let offset = pull.offset();
        assert!((offset.x - 7.5).abs() < 1e-4);
        assert_eq!(offset.y, 0.0);

        // Outside the radius: no pull
        pull.pointer_move(Point::new(250.0, 100.0));
        assert_eq!(pull.offset(), Vec2::ZERO);
    }

    #[test]
    fn test_cursor_follow_eases_toward_target() {
        let mut follow = CursorFollow::new(MotionGate::new());
        follow.pointer_move(Point::new(100.0, 0.0));

        // One frame covers the smoothing fraction of the remaining distance
        assert!(follow.tick());
        assert!((follow.position().x - 15.0).abs() < 1e-4);

        assert!(follow.tick());
        assert!((follow.position().x - 27.75).abs() < 1e-4);
    }

    #[test]
    fn test_cursor_follow_converges_and_snaps() {
        let mut follow = CursorFollow::with_smoothing(MotionGate::new(), 0.5);
        follow.pointer_move(Point::new(10.0, 10.0));

        let mut frames = 0;
        while follow.tick() {
            frames += 1;
            assert!(frames < 100, "trail never converged");
        }
        assert_eq!(follow.position(), Point::new(10.0, 10.0));

        // At the target: nothing left to do
        assert!(!follow.tick());
    }

    #[test]
    fn test_cursor_follow_reduced_motion_snaps_immediately() {
        let gate = MotionGate::with_preference(MotionPreference::Reduced);
        let mut follow = CursorFollow::new(gate);
        follow.pointer_move(Point::new(200.0, 50.0));
        assert_eq!(follow.position(), Point::new(200.0, 50.0));
        assert!(!follow.tick());
    }

    #[test]
    fn test_magnetic_pull_reduced_motion() {
        let gate = MotionGate::with_preference(MotionPreference::Reduced);
        let mut pull = MagneticPull::new(gate);
        pull.set_center(Point::new(0.0, 0.0));
        pull.pointer_move(Point::new(10.0, 0.0));
        assert_eq!(pull.offset(), Vec2::ZERO);
    }
}
