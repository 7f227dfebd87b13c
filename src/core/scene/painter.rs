//=========================================================================
// Painter Collaborator
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::geometry::{Position, Size};
use super::ObjectRef;

//=== Painter =============================================================

/// Renders scene objects into the platform's drawing context.
///
/// Called only from the dispatch thread, and only while the drawing
/// context is live.
pub trait Painter: Send {
    /// One-time setup, deferred until the first paint with a live context.
    fn init(&mut self);

    /// Draws `object` at its absolute `position` in a frame of `frame` size.
    fn paint(&mut self, object: &ObjectRef, position: Position, frame: Size);

    /// Releases textures of objects that changed; returns how many.
    fn free_dirty_textures(&mut self) -> usize {
        0
    }

    /// Presents the finished frame.
    fn publish(&mut self) {}

    /// Drops cached glyphs and theme-derived resources.
    fn clear_caches(&mut self) {}
}
