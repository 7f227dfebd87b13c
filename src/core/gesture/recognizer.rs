//=========================================================================
// Gesture Recognizer
//=========================================================================
//
// Per-identifier tap sessions.
//
// Session Flow:
// ```text
//   tap_down ──> session { down time, last position, touched }
//      │
//   tap_move ──(below threshold, not dragging)──> ignored
//      │  └──(threshold crossed)──> touch_cancel? ─> drag selected ─> dragged
//      │
//   tap_up ──(dragging)──> drag_end
//         └──(short)──> double-tap arbiter | tap
//         └──(held)───> secondary tap
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

//=== External Dependencies ===============================================

use log::trace;

//=== Internal Dependencies ===============================================

use super::double_tap::DoubleTapArbiter;
use super::{DragEvent, GestureConfig, PointEvent, TapHandlers, TouchId};
use crate::core::geometry::{Delta, Position};
use crate::core::scene::{
    same_object, CanvasObject, Capabilities, Layer, ObjectRef, Scene, WeakObjectRef,
};

//=== TapSession ==========================================================

struct DragState {
    object: WeakObjectRef,
    start: Position,
    offset: Position,
}

struct TapSession {
    down_time: Instant,
    last_position: Position,
    touched: Option<WeakObjectRef>,
    drag: Option<DragState>,
}

//=== GestureRecognizer ===================================================

/// Classifies raw pointer samples into semantic gestures.
///
/// Driven from the dispatch thread only; needs no internal locking apart
/// from the double-tap arbiter it shares with its deadline thread.
pub struct GestureRecognizer {
    config: GestureConfig,
    sessions: HashMap<TouchId, TapSession>,
    double_tap: DoubleTapArbiter,
}

impl GestureRecognizer {
    pub fn new(config: GestureConfig) -> Self {
        assert!(
            config.drag_threshold >= 0.0,
            "Drag threshold must not be negative, got {}",
            config.drag_threshold
        );

        Self {
            double_tap: DoubleTapArbiter::new(config.double_tap_window),
            config,
            sessions: HashMap::new(),
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Number of identifiers currently pressed.
    pub fn active_touches(&self) -> usize {
        self.sessions.len()
    }

    /// Delivers any tap still waiting on the double-tap window.
    ///
    /// Called when dispatch stops, before the handlers are shut down.
    pub fn flush(&mut self) {
        self.double_tap.flush();
    }

    //--- tap_down() -------------------------------------------------------

    /// Starts a session for `id`, replacing any previous one.
    pub fn tap_down(&mut self, position: Position, id: TouchId, scene: &mut dyn Scene) {
        let hit = scene.hit_test(position, &|obj: &dyn CanvasObject| {
            obj.capabilities()
                .intersects(Capabilities::TOUCHABLE | Capabilities::FOCUSABLE)
        });

        let mut touched = None;
        if let Some(hit) = hit.as_ref().filter(|h| h.has(Capabilities::TOUCHABLE)) {
            hit.object.touch_down(&PointEvent {
                position: hit.local_position,
                absolute_position: position,
            });
            touched = Some(Arc::downgrade(&hit.object));
        }

        self.sessions.insert(
            id,
            TapSession {
                down_time: Instant::now(),
                last_position: position,
                touched,
                drag: None,
            },
        );

        let keep_focus = match &hit {
            Some(hit) if hit.layer == Layer::Chrome => true,
            Some(hit) if hit.has(Capabilities::FOCUSABLE) => scene
                .focused()
                .map_or(false, |focused| same_object(&focused, &hit.object)),
            _ => false,
        };
        if !keep_focus {
            scene.unfocus();
        }

        trace!(target: "gesture", "Down #{id} at ({}, {})", position.x, position.y);
    }

    //--- tap_move() -------------------------------------------------------

    /// Advances the session for `id`; emits a drag step once the drag
    /// threshold has been crossed over a draggable object.
    pub fn tap_move<F>(&mut self, position: Position, id: TouchId, scene: &mut dyn Scene, on_drag: F)
    where
        F: FnOnce(ObjectRef, DragEvent),
    {
        let Some(session) = self.sessions.get_mut(&id) else {
            return;
        };

        let previous = session.last_position;
        let delta = Delta::between(previous, position);
        if session.drag.is_none() && delta.within(self.config.drag_threshold) {
            return;
        }
        session.last_position = position;

        let hit = scene.hit_test(position, &|obj: &dyn CanvasObject| {
            obj.capabilities()
                .intersects(Capabilities::DRAGGABLE | Capabilities::TOUCHABLE)
        });

        if let Some(touched) = session.touched.take().and_then(|weak| weak.upgrade()) {
            let still_over = hit.as_ref().map_or(false, |h| {
                h.has(Capabilities::TOUCHABLE) && same_object(&h.object, &touched)
            });
            if still_over {
                session.touched = Some(Arc::downgrade(&touched));
            } else {
                touched.touch_cancel(&PointEvent {
                    position: position - touched.position(),
                    absolute_position: position,
                });
            }
        }

        if session.drag.is_none() {
            match hit.filter(|h| h.has(Capabilities::DRAGGABLE)) {
                Some(hit) => {
                    trace!(target: "gesture", "Drag #{id} started");
                    session.drag = Some(DragState {
                        object: Arc::downgrade(&hit.object),
                        start: hit.object.position(),
                        offset: previous - hit.local_position,
                    });
                }
                None => return,
            }
        }

        let Some(drag) = session.drag.as_ref() else {
            return;
        };
        let Some(object) = drag.object.upgrade() else {
            return;
        };

        let moved_since_start = drag.start - object.position();
        let event = DragEvent {
            position: position - drag.offset + moved_since_start,
            dragged: delta,
        };
        on_drag(object, event);
    }

    //--- tap_up() ---------------------------------------------------------

    /// Ends the session for `id` and resolves its outcome.
    pub fn tap_up(
        &mut self,
        position: Position,
        id: TouchId,
        scene: &mut dyn Scene,
        handlers: &TapHandlers,
    ) {
        let Some(session) = self.sessions.remove(&id) else {
            return;
        };

        if let Some(drag) = session.drag {
            if let Some(object) = drag.object.upgrade() {
                trace!(target: "gesture", "Drag #{id} ended");
                (handlers.drag_end)(object);
            }
            return;
        }

        let held = session.down_time.elapsed();

        let Some(hit) = scene.hit_test(position, &|obj: &dyn CanvasObject| {
            obj.capabilities().intersects(
                Capabilities::TAPPABLE
                    | Capabilities::SECONDARY_TAPPABLE
                    | Capabilities::TOUCHABLE
                    | Capabilities::DOUBLE_TAPPABLE,
            )
        }) else {
            return;
        };

        let event = PointEvent {
            position: hit.local_position,
            absolute_position: position,
        };

        if hit.has(Capabilities::TOUCHABLE) {
            hit.object.touch_up(&event);
        }

        if held < self.config.secondary_tap_delay {
            if hit.has(Capabilities::DOUBLE_TAPPABLE) {
                self.double_tap.register(
                    hit.object,
                    event,
                    Arc::clone(&handlers.tap),
                    Arc::clone(&handlers.double_tap),
                );
            } else if hit.has(Capabilities::TAPPABLE) {
                trace!(target: "gesture", "Tap #{id}");
                (handlers.tap)(hit.object, event);
            }
        } else if hit.has(Capabilities::SECONDARY_TAPPABLE) {
            trace!(target: "gesture", "Secondary tap #{id} after {held:?}");
            (handlers.secondary_tap)(hit.object, event);
        }
    }
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

//=========================================================================
// Tests
//=========================================================================
