//=========================================================================
// Aetheric Runtime — Library Root
//
// This crate defines the public API surface of the Aetheric runtime: the
// event-driven core of an interactive GUI.
//
// Responsibilities:
// - Expose the runtime facade (`Engine`, `EngineBuilder`)
// - Keep OS integration (`platform`) hidden from end users
// - Expose the building blocks (queues, animations, gestures, dispatch)
//   for hosts that drive their own platform layer
//
// Typical usage:
// ```no_run
// use aetheric_runtime::EngineBuilder;
//
// fn main() {
//     EngineBuilder::new()
//         .build(my_scene(), my_painter())
//         .run()
//         .unwrap();
// }
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` contains every platform-independent subsystem. It is public so
// that hosts with their own event source can feed a `DriverLoop`
// directly; most applications only need the `Engine` facade.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `platform` contains the Winit integration (window, event loop, input
// translation) and is not part of the public API surface.
//
mod engine;
mod platform;

//--- Public Exports ------------------------------------------------------

pub use engine::{Engine, EngineBuilder};
