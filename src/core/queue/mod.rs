//=========================================================================
// Event Queues
//=========================================================================
//
// Unbounded producer/consumer queues for platform event delivery.
//
// Components:
// - `unbounded`: the non-blocking-producer FIFO (`EventQueue<T>`)
// - `registry`: one shared queue per element type (`QueueRegistry`)
//
//=========================================================================

//=== Module Declarations =================================================

mod registry;
mod unbounded;

//=== Public API ==========================================================

pub use registry::QueueRegistry;
pub use unbounded::{EventQueue, DEFAULT_BUFFER_CAPACITY};
