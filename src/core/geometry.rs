//=========================================================================
// Geometry
//=========================================================================
//
// Logical-pixel positions, deltas and sizes shared by the gesture
// recognizer, the scene collaborator and the painter.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::ops::{Add, Sub};

//=== Position ============================================================

/// A point in logical pixels, top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y)
    }
}

//=== Delta ===============================================================

/// Per-axis movement between two pointer samples.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Delta {
    pub dx: f32,
    pub dy: f32,
}

impl Delta {
    pub fn between(from: Position, to: Position) -> Self {
        Self {
            dx: to.x - from.x,
            dy: to.y - from.y,
        }
    }

    /// True when both axes moved strictly less than `threshold`.
    pub fn within(&self, threshold: f32) -> bool {
        self.dx.abs() < threshold && self.dy.abs() < threshold
    }
}

//=== Size ================================================================

/// Width and height in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_arithmetic() {
        let a = Position::new(10.0, 20.0);
        let b = Position::new(3.0, 5.0);

        assert_eq!(a + b, Position::new(13.0, 25.0));
        assert_eq!(a - b, Position::new(7.0, 15.0));
    }

    #[test]
    fn delta_within_threshold_is_per_axis() {
        let origin = Position::new(100.0, 100.0);

        assert!(Delta::between(origin, Position::new(103.0, 97.0)).within(4.0));
        assert!(!Delta::between(origin, Position::new(104.0, 100.0)).within(4.0));
        assert!(!Delta::between(origin, Position::new(100.0, 95.0)).within(4.0));
    }
}
