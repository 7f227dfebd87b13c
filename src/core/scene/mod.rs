//=========================================================================
// Scene Collaborator
//=========================================================================
//
// Interfaces the runtime requires from the widget tree. The runtime never
// inspects object internals: it hit-tests, queries capabilities and
// identity, and forwards semantic events.
//
// Architecture:
//   GestureRecognizer ──hit_test()──> Scene ──> Hit { object, local, layer }
//          │                                        │
//          └──── touch/tap/drag notifications ──────┘ (CanvasObject)
//
// Object identity is pointer identity of the shared `Arc`. A scene that
// rebuilds objects on relayout hands the recognizer a different identity
// for the same logical widget, which makes a double tap across that
// relayout resolve as a single tap.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::sync::{Arc, Weak};

//=== External Dependencies ===============================================

use bitflags::bitflags;

//=== Internal Dependencies ===============================================

use crate::core::geometry::{Position, Size};
use crate::core::gesture::{DragEvent, PointEvent};
use crate::core::input::KeyEvent;
use crate::core::settings::ThemeVariant;

//=== Module Declarations =================================================

mod painter;

//=== Public API ==========================================================

pub use painter::Painter;

//=== Capabilities ========================================================

bitflags! {
    /// Interaction roles a canvas object takes part in.
    ///
    /// Combine with bitwise OR: `Capabilities::TAPPABLE | Capabilities::FOCUSABLE`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u8 {
        const TOUCHABLE = 1 << 0;
        const FOCUSABLE = 1 << 1;
        const DRAGGABLE = 1 << 2;
        const TAPPABLE = 1 << 3;
        const SECONDARY_TAPPABLE = 1 << 4;
        const DOUBLE_TAPPABLE = 1 << 5;
    }
}

//=== CanvasObject ========================================================

/// Shared, identity-comparable handle to a canvas object.
pub type ObjectRef = Arc<dyn CanvasObject>;

/// Identity-only handle; never keeps the object alive.
pub type WeakObjectRef = Weak<dyn CanvasObject>;

/// An object in the scene that can receive interaction events.
///
/// Handlers default to no-ops; objects override the ones matching their
/// [`Capabilities`].
pub trait CanvasObject: Send + Sync {
    /// Absolute position of the object's top-left corner.
    fn position(&self) -> Position;

    fn capabilities(&self) -> Capabilities;

    //--- Touch ------------------------------------------------------------

    fn touch_down(&self, _event: &PointEvent) {}
    fn touch_up(&self, _event: &PointEvent) {}
    fn touch_cancel(&self, _event: &PointEvent) {}

    //--- Taps -------------------------------------------------------------

    fn tapped(&self, _event: &PointEvent) {}
    fn tapped_secondary(&self, _event: &PointEvent) {}
    fn double_tapped(&self, _event: &PointEvent) {}

    //--- Drag -------------------------------------------------------------

    fn dragged(&self, _event: &DragEvent) {}
    fn drag_end(&self) {}

    //--- Keyboard ---------------------------------------------------------

    fn typed_key(&self, _event: &KeyEvent) {}
    fn typed_rune(&self, _rune: char) {}

    /// Whether Tab is delivered as input instead of moving focus.
    fn accepts_tab(&self) -> bool {
        false
    }
}

/// True if both handles point at the same object.
pub fn same_object(a: &ObjectRef, b: &ObjectRef) -> bool {
    Arc::as_ptr(a) as *const () == Arc::as_ptr(b) as *const ()
}

//=== Hit =================================================================

/// Object tree a hit was found in, topmost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    /// Pop-ups and other overlays.
    Overlay,

    /// Window head and menu. Touches here keep the current focus.
    Chrome,

    /// Window content.
    Content,
}

/// Result of a successful hit test.
#[derive(Clone)]
pub struct Hit {
    pub object: ObjectRef,

    /// Hit position relative to the object's origin.
    pub local_position: Position,

    pub layer: Layer,
}

impl Hit {
    pub fn has(&self, capability: Capabilities) -> bool {
        self.object.capabilities().contains(capability)
    }
}

//=== Scene ===============================================================

/// The widget-tree collaborator driven by the dispatch loop.
///
/// Only ever called from the dispatch thread.
pub trait Scene: Send {
    /// Finds the topmost object at `position` for which `matches` holds.
    fn hit_test(&self, position: Position, matches: &dyn Fn(&dyn CanvasObject) -> bool)
        -> Option<Hit>;

    //--- Focus ------------------------------------------------------------

    fn focus(&mut self, object: &ObjectRef);
    fn unfocus(&mut self);
    fn focused(&self) -> Option<ObjectRef>;

    fn focus_next(&mut self) {}
    fn focus_previous(&mut self) {}

    //--- Rendering State --------------------------------------------------

    fn mark_dirty(&mut self);

    /// Returns whether the scene was dirty and clears the flag.
    fn check_dirty_and_clear(&mut self) -> bool;

    /// Lays content out for a new logical size.
    fn resize(&mut self, _size: Size) {}

    /// Area not covered by system UI (notches, status bars), in logical
    /// pixels. Window content should be laid out inside it.
    fn set_safe_area(&mut self, _origin: Position, _size: Size) {}

    /// Visits every visible object with its absolute position, in paint
    /// order.
    fn walk(&self, visit: &mut dyn FnMut(&ObjectRef, Position));

    /// Re-applies the theme to objects outside the main tree (menus,
    /// window head) that would otherwise miss the change.
    fn apply_theme(&mut self, _variant: ThemeVariant) {}
}

//=========================================================================
// Tests
//=========================================================================
