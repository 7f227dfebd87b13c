//=========================================================================
// Keyboard Input
//
// Key names, modifier state and routing of key presses to the focused
// object.
//
// Responsibilities:
// - Define the portable key representation (`event`)
// - Route presses through Tab focus traversal to the focused object or
//   the registered fallback handlers (`routing`)
//
// Notes:
// Routing runs on the dispatch thread only, like every other scene call.
//
//=========================================================================

//=== Submodules ==========================================================

pub mod event;
mod routing;

//=== Public API ==========================================================

pub use event::{KeyDirection, KeyEvent, KeyName, KeySample, Modifiers};
pub use routing::KeyFallback;

pub(crate) use routing::route_key;
