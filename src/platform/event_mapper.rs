//=========================================================================
// Platform Event Mapper
//
// Converts Winit input types to the runtime's portable representation.
// Provides a clean separation between OS-specific input and the
// runtime's internal key and touch types.
//
// Responsibilities:
// - Translate physical key codes and modifier state
// - Translate touch phases (a cancelled touch ends its sequence)
// - Provide fallbacks (`Unidentified`) for unmapped keys
//
//=========================================================================

use winit::event::TouchPhase as WinitTouchPhase;
use winit::keyboard::{KeyCode as WinitKeyCode, ModifiersState, PhysicalKey};

use crate::core::input::{KeyName, Modifiers};
use crate::core::platform_bridge::TouchPhase;

//=== Key Conversion ======================================================
//
// Keypad digits share the number row names; keypad Enter is Enter.
// Everything else without a counterpart maps to `Unidentified`.
//

impl From<WinitKeyCode> for KeyName {
    fn from(code: WinitKeyCode) -> Self {
        use WinitKeyCode::*;
        match code {
            //--- Numeric keys -----------------------------------------------------
            Digit0 | Numpad0 => KeyName::Digit0, Digit1 | Numpad1 => KeyName::Digit1,
            Digit2 | Numpad2 => KeyName::Digit2, Digit3 | Numpad3 => KeyName::Digit3,
            Digit4 | Numpad4 => KeyName::Digit4, Digit5 | Numpad5 => KeyName::Digit5,
            Digit6 | Numpad6 => KeyName::Digit6, Digit7 | Numpad7 => KeyName::Digit7,
            Digit8 | Numpad8 => KeyName::Digit8, Digit9 | Numpad9 => KeyName::Digit9,

            //--- Alphabetic keys --------------------------------------------------
            KeyA => KeyName::KeyA, KeyB => KeyName::KeyB, KeyC => KeyName::KeyC,
            KeyD => KeyName::KeyD, KeyE => KeyName::KeyE, KeyF => KeyName::KeyF,
            KeyG => KeyName::KeyG, KeyH => KeyName::KeyH, KeyI => KeyName::KeyI,
            KeyJ => KeyName::KeyJ, KeyK => KeyName::KeyK, KeyL => KeyName::KeyL,
            KeyM => KeyName::KeyM, KeyN => KeyName::KeyN, KeyO => KeyName::KeyO,
            KeyP => KeyName::KeyP, KeyQ => KeyName::KeyQ, KeyR => KeyName::KeyR,
            KeyS => KeyName::KeyS, KeyT => KeyName::KeyT, KeyU => KeyName::KeyU,
            KeyV => KeyName::KeyV, KeyW => KeyName::KeyW, KeyX => KeyName::KeyX,
            KeyY => KeyName::KeyY, KeyZ => KeyName::KeyZ,

            //--- Navigation -------------------------------------------------------
            ArrowDown => KeyName::ArrowDown, ArrowLeft => KeyName::ArrowLeft,
            ArrowRight => KeyName::ArrowRight, ArrowUp => KeyName::ArrowUp,
            Home => KeyName::Home, End => KeyName::End,
            PageUp => KeyName::PageUp, PageDown => KeyName::PageDown,

            //--- Editing ----------------------------------------------------------
            Space => KeyName::Space,
            Enter | NumpadEnter => KeyName::Enter,
            Escape => KeyName::Escape,
            Tab => KeyName::Tab,
            Backspace => KeyName::Backspace,
            Delete => KeyName::Delete,
            Insert => KeyName::Insert,

            //--- Function keys ----------------------------------------------------
            F1 => KeyName::F1, F2 => KeyName::F2, F3 => KeyName::F3,
            F4 => KeyName::F4, F5 => KeyName::F5, F6 => KeyName::F6,
            F7 => KeyName::F7, F8 => KeyName::F8, F9 => KeyName::F9,
            F10 => KeyName::F10, F11 => KeyName::F11, F12 => KeyName::F12,

            //--- Punctuation ------------------------------------------------------
            Semicolon => KeyName::Semicolon, Equal => KeyName::Equal,
            Quote => KeyName::Apostrophe, Comma => KeyName::Comma,
            Minus => KeyName::Minus, Period => KeyName::Period,
            Slash => KeyName::Slash, BracketLeft => KeyName::LeftBracket,
            Backslash => KeyName::Backslash, BracketRight => KeyName::RightBracket,
            Backquote => KeyName::Backquote,

            //--- Fallback ---------------------------------------------------------
            _ => KeyName::Unidentified,
        }
    }
}

impl From<PhysicalKey> for KeyName {
    fn from(key: PhysicalKey) -> Self {
        match key {
            PhysicalKey::Code(code) => KeyName::from(code),
            PhysicalKey::Unidentified(_) => KeyName::Unidentified,
        }
    }
}

//=== Modifier Conversion =================================================

/// Winit normalizes platform keys (macOS Cmd → Ctrl, Option → Alt).
impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
        }
    }
}

//=== Touch Conversion ====================================================

impl From<WinitTouchPhase> for TouchPhase {
    fn from(phase: WinitTouchPhase) -> Self {
        match phase {
            WinitTouchPhase::Started => TouchPhase::Begin,
            WinitTouchPhase::Moved => TouchPhase::Move,
            WinitTouchPhase::Ended | WinitTouchPhase::Cancelled => TouchPhase::End,
        }
    }
}

//=========================================================================
// Tests
//=========================================================================
