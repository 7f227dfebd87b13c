//=========================================================================
// Queue Registry
//=========================================================================
//
// Owns at most one shared EventQueue per element type.
//
// Architecture:
//   queue::<T>() → HashMap<TypeId, Box<dyn SharedQueue>>
//                        │ (lazy insert on first use)
//                        ↓
//                  Arc<EventQueue<T>>
//
// The registry is an ordinary value. `Engine` owns one and takes its
// platform event queue from it; `Engine::run` calls `reset()` on exit,
// which closes every queue so the next `queue::<T>()` starts fresh.
// `QueueRegistry::global()` exists for hosts that want a single
// process-wide instance.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

//=== External Dependencies ===============================================

use log::debug;

//=== Internal Dependencies ===============================================

use super::unbounded::{EventQueue, DEFAULT_BUFFER_CAPACITY};

//=== SharedQueue =========================================================

/// Type-erased view of a registered queue.
///
/// Lets the registry close queues and hand out typed handles without
/// knowing the element type of each entry.
trait SharedQueue: Send + Sync {
    /// Closes the underlying queue (flush, then disconnect output).
    fn close_queue(&self);

    /// Downcasts to `&dyn Any` to recover the typed handle.
    fn as_any(&self) -> &dyn Any;
}

impl<T: Send + 'static> SharedQueue for Arc<EventQueue<T>> {
    fn close_queue(&self) {
        self.close();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

//=== QueueRegistry =======================================================

/// Lazily creates and shares one [`EventQueue`] per element type.
pub struct QueueRegistry {
    queues: Mutex<HashMap<TypeId, Box<dyn SharedQueue>>>,
    capacity: usize,
}

impl QueueRegistry {
    /// Creates an empty registry whose queues use the default buffer size.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Creates an empty registry whose queues use `capacity`-sized buffers.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "Queue buffer capacity must be positive");
        Self {
            queues: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    /// Process-wide registry, created on first access.
    pub fn global() -> &'static QueueRegistry {
        static GLOBAL: OnceLock<QueueRegistry> = OnceLock::new();
        GLOBAL.get_or_init(QueueRegistry::new)
    }

    //--- Queue Access -----------------------------------------------------

    /// Returns the shared queue for `T`, creating it on first use.
    pub fn queue<T: Send + 'static>(&self) -> Arc<EventQueue<T>> {
        let mut queues = self.lock();

        let entry = queues.entry(TypeId::of::<T>()).or_insert_with(|| {
            debug!(
                target: "queue",
                "Creating shared queue for {}",
                std::any::type_name::<T>()
            );
            Box::new(Arc::new(EventQueue::<T>::with_capacity(self.capacity)))
        });

        entry
            .as_any()
            .downcast_ref::<Arc<EventQueue<T>>>()
            .cloned()
            .expect("Type mismatch in QueueRegistry")
    }

    /// Returns true if a queue for `T` has been created.
    pub fn contains<T: Send + 'static>(&self) -> bool {
        self.lock().contains_key(&TypeId::of::<T>())
    }

    /// Number of queues currently registered.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if no queue has been created yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    //--- Teardown ---------------------------------------------------------

    /// Closes every registered queue and forgets it.
    ///
    /// Handles obtained earlier keep working as closed queues; the next
    /// [`QueueRegistry::queue`] call for a type creates a fresh one.
    pub fn reset(&self) {
        let drained: Vec<_> = self.lock().drain().collect();
        for (_, queue) in &drained {
            queue.close_queue();
        }
        debug!(target: "queue", "Queue registry reset ({} queues closed)", drained.len());
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<TypeId, Box<dyn SharedQueue>>> {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for QueueRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
