//=========================================================================
// Key Routing
//=========================================================================
//
// Delivers key presses to the focused object or the fallback handlers.
//
// Architecture:
//   KeySample ─(press)─> Tab traversal? ──yes──> Scene::focus_next/previous
//                             │ no
//                             ↓
//                 focused object ──or──> KeyFallback handlers
//
//=========================================================================

//=== External Dependencies ===============================================

use log::trace;

//=== Internal Dependencies ===============================================

use super::event::{KeyDirection, KeyEvent, KeyName, KeySample, Modifiers};
use crate::core::scene::Scene;

//=== KeyFallback =========================================================

type KeyHandler = Box<dyn Fn(&KeyEvent) + Send>;
type RuneHandler = Box<dyn Fn(char) + Send>;

/// Handlers receiving key input while nothing is focused.
#[derive(Default)]
pub struct KeyFallback {
    on_typed_key: Option<KeyHandler>,
    on_typed_rune: Option<RuneHandler>,
}

impl KeyFallback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_on_typed_key<F>(&mut self, handler: F)
    where
        F: Fn(&KeyEvent) + Send + 'static,
    {
        self.on_typed_key = Some(Box::new(handler));
    }

    pub fn set_on_typed_rune<F>(&mut self, handler: F)
    where
        F: Fn(char) + Send + 'static,
    {
        self.on_typed_rune = Some(Box::new(handler));
    }
}

//=== Routing =============================================================

/// Routes one key sample. Releases are ignored.
pub(crate) fn route_key(scene: &mut dyn Scene, sample: &KeySample, fallback: &KeyFallback) {
    if sample.direction == KeyDirection::Release {
        return;
    }

    let focused = scene.focused();

    if sample.name == KeyName::Tab {
        let captured = focused.as_ref().map_or(false, |obj| obj.accepts_tab());
        if !captured {
            if sample.modifiers.is_empty() {
                trace!(target: "driver", "Tab: focus next");
                scene.focus_next();
                return;
            }
            if sample.modifiers == Modifiers::SHIFT {
                trace!(target: "driver", "Shift+Tab: focus previous");
                scene.focus_previous();
                return;
            }
        }
    }

    let event = (sample.name != KeyName::Unidentified).then(|| KeyEvent {
        name: sample.name,
        modifiers: sample.modifiers,
    });
    let rune = sample.printable_rune();

    match focused {
        Some(object) => {
            if let Some(event) = &event {
                object.typed_key(event);
            }
            if let Some(rune) = rune {
                object.typed_rune(rune);
            }
        }
        None => {
            if let (Some(event), Some(handler)) = (&event, &fallback.on_typed_key) {
                handler(event);
            }
            if let (Some(rune), Some(handler)) = (rune, &fallback.on_typed_rune) {
                handler(rune);
            }
        }
    }
}

//=========================================================================
// Tests
//=========================================================================
