//! Easing functions
//!
//! Monotonic mappings from normalized time [0,1] to normalized progress
//! [0,1], shaping animation velocity. All curves satisfy `apply(0) == 0`
//! and `apply(1) == 1`.

/// Easing curve applied to animation progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Easing {
    /// Constant velocity
    Linear,
    /// Fast start, cubic deceleration: `1 - (1-t)^3`
    #[default]
    EaseOut,
    /// Slow start and end: `4t^3` for t < 0.5, else `1 - (-2t+2)^3 / 2`
    EaseInOut,
}

impl Easing {
    /// Apply the curve to a normalized progress value
    ///
    /// Input is clamped to [0, 1].
    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 3] = [Easing::Linear, Easing::EaseOut, Easing::EaseInOut];

    #[test]
    fn test_endpoints() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{easing:?} at 0");
            assert_eq!(easing.apply(1.0), 1.0, "{easing:?} at 1");
        }
    }

    #[test]
    fn test_monotonic() {
        for easing in ALL {
            let mut prev = 0.0;
            for i in 1..=100 {
                let value = easing.apply(i as f32 / 100.0);
                assert!(value >= prev, "{easing:?} not monotonic at step {i}");
                prev = value;
            }
        }
    }

    #[test]
    fn test_clamps_out_of_range_input() {
        for easing in ALL {
            assert_eq!(easing.apply(-1.0), 0.0);
            assert_eq!(easing.apply(2.0), 1.0);
        }
    }

    #[test]
    fn test_curve_shapes() {
        // Linear is the identity
        assert_eq!(Easing::Linear.apply(0.5), 0.5);

        // EaseOut is ahead of linear mid-run
        assert!(Easing::EaseOut.apply(0.5) > 0.5);
        assert!((Easing::EaseOut.apply(0.5) - 0.875).abs() < 1e-6);

        // EaseInOut is symmetric around the midpoint
        assert!((Easing::EaseInOut.apply(0.5) - 0.5).abs() < 1e-6);
        assert!((Easing::EaseInOut.apply(0.25) + Easing::EaseInOut.apply(0.75) - 1.0).abs() < 1e-6);
    }
}
