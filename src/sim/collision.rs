//! Overlap tests and field bounds
//!
//! Every collider in the field is a circle, so the hot paths are a single
//! squared-distance comparison.

use glam::Vec2;

/// Playfield rectangle with its origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldBounds {
    pub width: f32,
    pub height: f32,
}

impl FieldBounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// True once `pos` is more than `margin` past any edge
    pub fn outside(&self, pos: Vec2, margin: f32) -> bool {
        pos.x < -margin
            || pos.x > self.width + margin
            || pos.y < -margin
            || pos.y > self.height + margin
    }

    /// True once `pos` has left past the left, top or bottom edge.
    /// Hostiles enter from the right, so that edge never culls them.
    pub fn escaped(&self, pos: Vec2, margin: f32) -> bool {
        pos.x < -margin || pos.y < -margin || pos.y > self.height + margin
    }

    /// Keep a circle of `radius` fully inside the field
    pub fn clamp(&self, pos: Vec2, radius: f32) -> Vec2 {
        Vec2::new(
            pos.x.clamp(radius, (self.width - radius).max(radius)),
            pos.y.clamp(radius, (self.height - radius).max(radius)),
        )
    }
}

/// Check overlap between two circles
#[inline]
pub fn circles_overlap(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    let reach = a_radius + b_radius;
    a.distance_squared(b) < reach * reach
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(9.0, 0.0), 5.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
        assert!(circles_overlap(Vec2::ONE, 1.0, Vec2::ONE, 1.0));
    }

    #[test]
    fn test_outside_respects_margin() {
        let field = FieldBounds::new(100.0, 50.0);
        assert!(!field.outside(Vec2::new(105.0, 25.0), 10.0));
        assert!(field.outside(Vec2::new(111.0, 25.0), 10.0));
        assert!(field.outside(Vec2::new(50.0, -11.0), 10.0));
    }

    #[test]
    fn test_escaped_ignores_right_edge() {
        let field = FieldBounds::new(100.0, 50.0);
        assert!(!field.escaped(Vec2::new(500.0, 25.0), 10.0));
        assert!(field.escaped(Vec2::new(-11.0, 25.0), 10.0));
    }

    #[test]
    fn test_clamp() {
        let field = FieldBounds::new(100.0, 50.0);
        assert_eq!(field.clamp(Vec2::new(-5.0, 80.0), 5.0), Vec2::new(5.0, 45.0));
    }
}
