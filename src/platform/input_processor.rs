//=========================================================================
// Input Processor
//=========================================================================
//
// Converts Winit input into key and touch samples.
//
// Architecture:
//   Winit Events → InputProcessor → KeySample / TouchSample → EventQueue
//
// Stateful tracking: caches modifier state from ModifiersChanged events
// and the cursor position from CursorMoved events. The primary mouse
// button acts as a touch with identifier `MOUSE_POINTER_ID`; other
// buttons are ignored.
//
//=========================================================================

//=== External Dependencies ===============================================

use winit::{
    event::{ElementState, MouseButton as WinitMouseButton, TouchPhase as WinitTouchPhase},
    keyboard::{ModifiersState, PhysicalKey},
};

//=== Internal Dependencies ===============================================

use crate::core::geometry::Position;
use crate::core::gesture::TouchId;
use crate::core::input::{KeyName, KeySample, Modifiers};
use crate::core::platform_bridge::{TouchPhase, TouchSample};

//=== Constants ===========================================================

/// Touch identifier used for the primary mouse button. Winit numbers
/// fingers from zero, so the mouse takes the top of the range.
pub(crate) const MOUSE_POINTER_ID: TouchId = u64::MAX;

//=== InputProcessor ======================================================

/// Converts Winit input to samples with stateful modifier and cursor
/// tracking.
pub(crate) struct InputProcessor {
    current_modifiers: Modifiers,
    cursor: Position,
    mouse_down: bool,
}

impl InputProcessor {
    //--- Construction -----------------------------------------------------

    pub(crate) fn new() -> Self {
        Self {
            current_modifiers: Modifiers::NONE,
            cursor: Position::ZERO,
            mouse_down: false,
        }
    }

    //--- Modifier State Management ----------------------------------------

    /// Updates cached modifier state (applied to subsequent key samples).
    pub(crate) fn update_modifiers(&mut self, modifiers_state: ModifiersState) {
        self.current_modifiers = Modifiers::from(modifiers_state);
    }

    pub(crate) fn current_modifiers(&self) -> Modifiers {
        self.current_modifiers
    }

    //--- Keyboard ---------------------------------------------------------

    /// Builds a key sample. `text` is the text the key produced, if any;
    /// its first character becomes the rune.
    pub(crate) fn process_key(
        &self,
        physical_key: PhysicalKey,
        text: Option<&str>,
        state: ElementState,
    ) -> KeySample {
        let name = KeyName::from(physical_key);
        match state {
            ElementState::Pressed => {
                let rune = text.and_then(|t| t.chars().next());
                KeySample::press(name, rune, self.current_modifiers)
            }
            ElementState::Released => KeySample::release(name, self.current_modifiers),
        }
    }

    //--- Pointer ----------------------------------------------------------

    /// Tracks the cursor; yields a move sample while the primary button
    /// is held.
    pub(crate) fn process_cursor_move(&mut self, x: f32, y: f32) -> Option<TouchSample> {
        self.cursor = Position::new(x, y);
        self.mouse_down.then(|| self.mouse_sample(TouchPhase::Move))
    }

    /// Converts a primary button press or release at the cached cursor.
    pub(crate) fn process_mouse_button(
        &mut self,
        button: WinitMouseButton,
        state: ElementState,
    ) -> Option<TouchSample> {
        if button != WinitMouseButton::Left {
            return None;
        }

        match (state, self.mouse_down) {
            (ElementState::Pressed, false) => {
                self.mouse_down = true;
                Some(self.mouse_sample(TouchPhase::Begin))
            }
            (ElementState::Released, true) => {
                self.mouse_down = false;
                Some(self.mouse_sample(TouchPhase::End))
            }
            _ => None,
        }
    }

    /// Ends a held press when the cursor leaves the window.
    pub(crate) fn process_cursor_left(&mut self) -> Option<TouchSample> {
        if !self.mouse_down {
            return None;
        }
        self.mouse_down = false;
        Some(self.mouse_sample(TouchPhase::End))
    }

    pub(crate) fn process_touch(
        &self,
        phase: WinitTouchPhase,
        x: f32,
        y: f32,
        id: u64,
    ) -> TouchSample {
        TouchSample {
            position: Position::new(x, y),
            sequence: id,
            phase: TouchPhase::from(phase),
        }
    }

    //--- Internal Helpers -------------------------------------------------

    fn mouse_sample(&self, phase: TouchPhase) -> TouchSample {
        TouchSample {
            position: self.cursor,
            sequence: MOUSE_POINTER_ID,
            phase,
        }
    }
}

//=========================================================================
// Tests
//=========================================================================
