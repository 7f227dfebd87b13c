//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use aetheric_runtime::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Runtime facade
pub use crate::engine::{Engine, EngineBuilder};

// Geometry
pub use crate::core::geometry::{Delta, Position, Size};

// Animation
pub use crate::core::animation::{Animation, AnimationScheduler, Easing, REPEAT_FOREVER};

// Scene contracts
pub use crate::core::scene::{CanvasObject, Capabilities, ObjectRef, Painter, Scene};

// Input and gestures
pub use crate::core::gesture::{DragEvent, GestureConfig, PointEvent};
pub use crate::core::input::{KeyEvent, KeyFallback, KeyName, Modifiers};

// Lifecycle and settings
pub use crate::core::platform_bridge::Lifecycle;
pub use crate::core::settings::{Configuration, SettingsChange, ThemeVariant};
