//=========================================================================
// Gesture Recognition
//
// Classifies per-pointer down/move/up samples into taps, secondary taps,
// double taps and drags.
//
// Responsibilities:
// - Track one tap session per touch identifier (`recognizer`)
// - Arbitrate double taps across identifiers with a bounded wait
//   (`double_tap`)
// - Define the point and drag events handed to canvas objects
//
// Threading:
// The recognizer is driven from the dispatch thread only. The double-tap
// deadline thread is the single exception: it owns its cancellation and
// invokes the tap or double-tap handler itself.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

//=== Internal Dependencies ===============================================

use crate::core::geometry::{Delta, Position};
use crate::core::scene::ObjectRef;

//=== Module Declarations =================================================

mod double_tap;
mod recognizer;

//=== Public API ==========================================================

pub use recognizer::GestureRecognizer;

/// Platform touch or pointer sequence identifier. Reused across sequences.
pub type TouchId = u64;

//=== Events ==============================================================

/// A pointer position delivered to a canvas object.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PointEvent {
    /// Relative to the receiving object's origin.
    pub position: Position,

    /// Relative to the canvas.
    pub absolute_position: Position,
}

/// One drag step.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DragEvent {
    /// Pointer position in the dragged object's coordinate space.
    pub position: Position,

    /// Pointer movement since the previous step.
    pub dragged: Delta,
}

//=== GestureConfig =======================================================

/// Timing and distance thresholds for gesture classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    /// Movement, per axis and in logical pixels, below which a press is
    /// still a tap.
    pub drag_threshold: f32,

    /// Presses held at least this long resolve as secondary taps.
    pub secondary_tap_delay: Duration,

    /// How long a tap waits for a second tap on the same object.
    pub double_tap_window: Duration,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 4.0,
            secondary_tap_delay: Duration::from_millis(300),
            double_tap_window: Duration::from_millis(500),
        }
    }
}

//=== TapHandlers =========================================================

/// Outcome callback for tap-like gestures.
pub type TapCallback = Arc<dyn Fn(ObjectRef, PointEvent) + Send + Sync>;

/// Outcome callback for the end of a drag.
pub type DragEndCallback = Arc<dyn Fn(ObjectRef) + Send + Sync>;

/// The outcome callbacks of a release.
///
/// Cloned into the double-tap deadline thread, hence the shared handles.
#[derive(Clone)]
pub struct TapHandlers {
    pub tap: TapCallback,
    pub secondary_tap: TapCallback,
    pub double_tap: TapCallback,
    pub drag_end: DragEndCallback,
}

impl TapHandlers {
    pub fn new<T, S, D, E>(tap: T, secondary_tap: S, double_tap: D, drag_end: E) -> Self
    where
        T: Fn(ObjectRef, PointEvent) + Send + Sync + 'static,
        S: Fn(ObjectRef, PointEvent) + Send + Sync + 'static,
        D: Fn(ObjectRef, PointEvent) + Send + Sync + 'static,
        E: Fn(ObjectRef) + Send + Sync + 'static,
    {
        Self {
            tap: Arc::new(tap),
            secondary_tap: Arc::new(secondary_tap),
            double_tap: Arc::new(double_tap),
            drag_end: Arc::new(drag_end),
        }
    }

    /// Handlers that call the object's own methods on the current thread.
    pub fn direct() -> Self {
        Self::new(
            |object, event| object.tapped(&event),
            |object, event| object.tapped_secondary(&event),
            |object, event| object.double_tapped(&event),
            |object| object.drag_end(),
        )
    }
}

impl fmt::Debug for TapHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapHandlers").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds() {
        let config = GestureConfig::default();
        assert_eq!(config.drag_threshold, 4.0);
        assert_eq!(config.secondary_tap_delay, Duration::from_millis(300));
        assert_eq!(config.double_tap_window, Duration::from_millis(500));
    }
}
