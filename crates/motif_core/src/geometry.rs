//! Core geometry types
//!
//! Minimal 2D geometry used by the pointer-tracking and visibility layers:
//! element bounds, viewport rectangles, and pointer offsets.

/// 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn area(&self) -> f32 {
        self.width * self.height
    }
}

/// 2D rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn area(&self) -> f32 {
        self.size.area()
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.x <= self.origin.x + self.size.width
            && point.y >= self.origin.y
            && point.y <= self.origin.y + self.size.height
    }

    /// Grow the rect outward by a uniform margin (negative shrinks)
    pub fn expand(&self, margin: f32) -> Self {
        Rect {
            origin: Point::new(self.origin.x - margin, self.origin.y - margin),
            size: Size::new(
                (self.size.width + 2.0 * margin).max(0.0),
                (self.size.height + 2.0 * margin).max(0.0),
            ),
        }
    }

    /// Check if this rect intersects with another
    ///
    /// Returns true if the two rects overlap at any point.
    pub fn intersects(&self, other: &Rect) -> bool {
        let self_right = self.origin.x + self.size.width;
        let self_bottom = self.origin.y + self.size.height;
        let other_right = other.origin.x + other.size.width;
        let other_bottom = other.origin.y + other.size.height;

        self.origin.x < other_right
            && self_right > other.origin.x
            && self.origin.y < other_bottom
            && self_bottom > other.origin.y
    }

    /// Get the intersection of two rects (if they overlap)
    ///
    /// Returns None if the rects don't overlap.
    pub fn intersection(&self, other: &Rect) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }

        let x = self.origin.x.max(other.origin.x);
        let y = self.origin.y.max(other.origin.y);
        let right = (self.origin.x + self.size.width).min(other.origin.x + other.size.width);
        let bottom = (self.origin.y + self.size.height).min(other.origin.y + other.size.height);

        Some(Rect {
            origin: Point::new(x, y),
            size: Size::new(right - x, bottom - y),
        })
    }
}

/// 2D vector
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn scale(&self, factor: f32) -> Self {
        Vec2::new(self.x * factor, self.y * factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_center_and_contains() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.center(), Point::new(60.0, 45.0));
        assert!(rect.contains(Point::new(10.0, 20.0)));
        assert!(rect.contains(Point::new(110.0, 70.0)));
        assert!(!rect.contains(Point::new(111.0, 45.0)));
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);

        let overlap = a.intersection(&b).unwrap();
        assert_eq!(overlap, Rect::new(50.0, 50.0, 50.0, 50.0));
        assert_eq!(overlap.area(), 2500.0);

        let c = Rect::new(200.0, 200.0, 10.0, 10.0);
        assert!(a.intersection(&c).is_none());
    }

    #[test]
    fn test_rect_expand() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);
        let expanded = rect.expand(5.0);
        assert_eq!(expanded, Rect::new(5.0, 5.0, 30.0, 30.0));

        // Shrinking below zero clamps
        let collapsed = rect.expand(-15.0);
        assert_eq!(collapsed.size, Size::ZERO);
    }

    #[test]
    fn test_vec2_length() {
        assert_eq!(Vec2::new(3.0, 4.0).length(), 5.0);
        assert_eq!(Vec2::ZERO.length(), 0.0);
    }
}
