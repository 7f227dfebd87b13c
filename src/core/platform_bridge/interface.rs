//=========================================================================
// Platform Bridge Interface
//=========================================================================
//
// Platform-to-core interface types (events and errors).
//
// Defines the contract between producers on OS callback threads and the
// dispatch loop. Every variant travels through the event queue.
//
//=========================================================================

//=== External Dependencies ===============================================

use thiserror::Error;

//=== Internal Dependencies ===============================================

use super::lifecycle::LifecycleEvent;
use crate::core::geometry::Position;
use crate::core::gesture::TouchId;
use crate::core::input::KeySample;

//=== PlatformEvent =======================================================

/// Raw events sent from the platform to the dispatch loop.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    /// The application moved between lifecycle stages.
    Lifecycle(LifecycleEvent),

    /// The window or screen changed size, scale or appearance.
    Size(SizeEvent),

    /// The surface is ready for drawing.
    Paint(PaintEvent),

    /// One pointer or finger sample.
    Touch(TouchSample),

    /// One key press or release.
    Key(KeySample),
}

//=== SizeEvent ===========================================================

/// Insets of the area obscured by system UI, in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Insets {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

/// Surface geometry reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeEvent {
    pub width_px: u32,
    pub height_px: u32,

    /// Physical pixels per logical pixel.
    pub pixels_per_pt: f32,

    pub insets: Insets,

    /// Whether the system appearance is dark.
    pub dark_mode: bool,
}

//=== PaintEvent ==========================================================

/// Paint request.
///
/// `external` marks requests from the platform itself (e.g. a redraw
/// after expose). Those only acknowledge the surface; the dispatch loop
/// paints on its own requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PaintEvent {
    pub external: bool,
}

//=== TouchSample =========================================================

/// Stage of a touch sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchPhase {
    Begin,
    Move,
    End,
}

/// A pointer sample in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchSample {
    pub position: Position,

    /// Identifies the finger or pointer across one down/move/up sequence.
    pub sequence: TouchId,

    pub phase: TouchPhase,
}

//=== PlatformError =======================================================

/// Platform initialization and runtime errors.
///
/// These are fatal: without an event loop the runtime cannot run.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// Failed to create the event loop (rare, indicates an OS-level issue).
    #[error("Event loop creation failed: {0}")]
    EventLoopCreation(#[source] winit::error::EventLoopError),

    /// The event loop stopped with an error.
    #[error("Event loop error: {0}")]
    EventLoopExecution(#[source] winit::error::EventLoopError),
}

//=========================================================================
// Unit Tests
//=========================================================================
