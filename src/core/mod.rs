//=========================================================================
// Core Systems
//
// Platform-independent subsystems of the runtime.
//
// Components:
// - `queue`: unbounded FIFO between OS callbacks and the dispatch loop
// - `animation`: fixed-rate animation ticking on a background thread
// - `gesture`: tap, double-tap, secondary-tap and drag recognition
// - `input`: key samples and focus-aware key routing
// - `scene`: the canvas object, scene and painter contracts
// - `platform_bridge`: the event vocabulary shared with the platform
// - `driver`: the dispatch loop tying everything together
//
// Notes:
// Nothing here touches Winit. Only `crate::platform` translates OS
// events into `PlatformEvent`s.
//
//=========================================================================

pub mod animation;
pub mod driver;
pub mod geometry;
pub mod gesture;
pub mod input;
pub mod platform_bridge;
pub mod queue;
pub mod scene;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_support;
