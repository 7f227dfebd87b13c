//=========================================================================
// Key Event Types
//
// Portable representation of keyboard input.
//
// Responsibilities:
// - Name physical keys independently of the platform layer (winit)
// - Carry modifier state (Shift, Ctrl, Alt)
// - Separate the raw platform sample (`KeySample`) from the semantic
//   event delivered to focused objects (`KeyEvent`)
//
// Event Flow:
// ```text
// Platform Layer (winit)
//         ↓
//    KeySample (press/release, rune, modifiers)
//         ↓
//    key routing (Tab focus traversal, printable filter)
//         ↓
//    KeyEvent / rune → focused CanvasObject or fallback handlers
// ```
//
//=========================================================================

//=== KeyName =============================================================

/// Physical keyboard key identifier.
///
/// Represents the physical key location, not the character produced.
/// The character, if any, travels separately as the sample's rune.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyName {
    //--- Numeric Keys -----------------------------------------------------

    /// Number row and keypad digits: 0-9
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    //--- Alphabetic Keys --------------------------------------------------

    /// Letter keys: A-Z (physical location, not character)
    KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI,
    KeyJ, KeyK, KeyL, KeyM, KeyN, KeyO, KeyP, KeyQ, KeyR,
    KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,

    //--- Navigation -------------------------------------------------------

    ArrowDown, ArrowLeft, ArrowRight, ArrowUp,
    Home, End, PageUp, PageDown,

    //--- Editing ----------------------------------------------------------

    Space,
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Insert,

    //--- Function Keys ----------------------------------------------------

    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,

    //--- Punctuation ------------------------------------------------------

    Semicolon, Equal, Apostrophe, Comma, Minus, Period, Slash,
    LeftBracket, Backslash, RightBracket, Backquote,

    /// Key reported by the platform but not named here.
    ///
    /// Never delivered as a [`KeyEvent`]; its rune may still be typed.
    Unidentified,
}

//=== Modifiers ===========================================================

/// Modifier key state (Shift, Ctrl, Alt).
///
/// Left and right variants are not distinguished. On macOS Ctrl is
/// reported for Command and Alt for Option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    /// Shift only.
    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };

    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

//=== KeySample ===========================================================

/// Whether a key went down or up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyDirection {
    Press,
    Release,
}

/// Raw key sample produced by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeySample {
    pub name: KeyName,

    /// Character produced by the key, if any.
    pub rune: Option<char>,

    pub modifiers: Modifiers,
    pub direction: KeyDirection,
}

impl KeySample {
    pub fn press(name: KeyName, rune: Option<char>, modifiers: Modifiers) -> Self {
        Self {
            name,
            rune,
            modifiers,
            direction: KeyDirection::Press,
        }
    }

    pub fn release(name: KeyName, modifiers: Modifiers) -> Self {
        Self {
            name,
            rune: None,
            modifiers,
            direction: KeyDirection::Release,
        }
    }

    /// The rune if it is printable (control characters are dropped).
    pub fn printable_rune(&self) -> Option<char> {
        self.rune.filter(|r| !r.is_control())
    }
}

//=== KeyEvent ============================================================

/// Key event delivered to the focused object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub name: KeyName,
    pub modifiers: Modifiers,
}

//=========================================================================
// Tests
//=========================================================================
