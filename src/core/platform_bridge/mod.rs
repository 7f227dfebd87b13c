//=========================================================================
// Platform Bridge
//=========================================================================
//
// Bridges the platform layer (winit, or any other producer) with the
// dispatch loop.
//
// This module defines the contract between platform implementations and
// core logic, so backends can be swapped without touching the loop.
//
// Components:
// - `interface`: Event types and error definitions (the contract)
// - `lifecycle`: Lifecycle stages, crossings and application hooks
//
//=========================================================================

//=== Module Declarations =================================================

mod interface;
mod lifecycle;

//=== Public API ==========================================================

pub use interface::{
    Insets, PaintEvent, PlatformError, PlatformEvent, SizeEvent, TouchPhase, TouchSample,
};
pub use lifecycle::{Crossing, Hook, Lifecycle, LifecycleEvent, Stage};
