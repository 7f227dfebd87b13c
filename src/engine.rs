//=========================================================================
// Aetheric Runtime
//
// Main entry point and coordinator for the runtime.
//
// Architecture:
// ```text
//     EngineBuilder  ──build()──>  Engine  ──run()──>  [Runtime]
//         │                          │
//         ├─ with_repaint_rate()     ├─ spawns the dispatch thread
//         ├─ with_animation_rate()   ├─ runs the platform
//         └─ with_queue_capacity()   └─ blocks until exit
// ```
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::sync::Arc;
use std::thread;

//=== External Dependencies ===============================================

use crossbeam_channel::Receiver;
use log::{error, info};

//=== Internal Dependencies ===============================================

use crate::core::animation::{AnimationScheduler, DEFAULT_ANIMATION_RATE};
use crate::core::driver::{CallbackSender, DriverLoop, Invalidator, DEFAULT_REPAINT_RATE};
use crate::core::gesture::GestureConfig;
use crate::core::input::KeyFallback;
use crate::core::platform_bridge::{Lifecycle, PlatformError, PlatformEvent};
use crate::core::queue::{EventQueue, QueueRegistry, DEFAULT_BUFFER_CAPACITY};
use crate::core::scene::{Painter, Scene};
use crate::core::settings::{Configuration, SettingsChange};
use crate::platform::Platform;

//=== EngineBuilder =======================================================

/// Builder for configuring and constructing an [`Engine`].
///
/// # Default Values
///
/// - **Repaint rate**: 60.0 Hz
/// - **Animation rate**: 60.0 Hz
/// - **Queue buffer capacity**: 16 events
///
/// # Examples
///
/// ```no_run
/// use aetheric_runtime::EngineBuilder;
/// # use aetheric_runtime::core::scene::{Painter, Scene};
/// # fn scene() -> Box<dyn Scene> { unimplemented!() }
/// # fn painter() -> Box<dyn Painter> { unimplemented!() }
///
/// EngineBuilder::new()
///     .with_title("Notes")
///     .with_repaint_rate(120.0)
///     .build(scene(), painter())
///     .run()
///     .expect("event loop failed");
/// ```
pub struct EngineBuilder {
    title: String,
    repaint_rate: f64,
    animation_rate: f64,
    queue_capacity: usize,
    gesture: GestureConfig,
    settings: Option<Receiver<SettingsChange>>,
    lifecycle: Lifecycle,
    keys: KeyFallback,
    on_configuration_changed: Option<Box<dyn Fn(Configuration) + Send + Sync>>,
}

impl EngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            title: "Aetheric".into(),
            repaint_rate: DEFAULT_REPAINT_RATE,
            animation_rate: DEFAULT_ANIMATION_RATE,
            queue_capacity: DEFAULT_BUFFER_CAPACITY,
            gesture: GestureConfig::default(),
            settings: None,
            lifecycle: Lifecycle::new(),
            keys: KeyFallback::new(),
            on_configuration_changed: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets how often the dispatch loop checks for pending repaints.
    ///
    /// Default: 60.0
    ///
    /// # Panics
    ///
    /// Panics if `rate <= 0.0`.
    pub fn with_repaint_rate(mut self, rate: f64) -> Self {
        assert!(rate > 0.0, "Repaint rate must be positive, got {}", rate);
        self.repaint_rate = rate;
        self
    }

    /// Sets the animation tick frequency.
    ///
    /// Default: 60.0
    ///
    /// # Panics
    ///
    /// Panics if `rate <= 0.0`.
    pub fn with_animation_rate(mut self, rate: f64) -> Self {
        assert!(rate > 0.0, "Animation rate must be positive, got {}", rate);
        self.animation_rate = rate;
        self
    }

    /// Sets the size of the event queue's internal buffers. The queue
    /// itself stays unbounded.
    ///
    /// Default: 16
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        assert!(capacity > 0, "Queue capacity must be positive");
        self.queue_capacity = capacity;
        self
    }

    pub fn with_gesture_config(mut self, config: GestureConfig) -> Self {
        self.gesture = config;
        self
    }

    /// Source of system settings notifications (theme changes).
    pub fn with_settings(mut self, settings: Receiver<SettingsChange>) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    /// Receivers for keys that arrive while nothing is focused.
    pub fn with_key_fallback(mut self, keys: KeyFallback) -> Self {
        self.keys = keys;
        self
    }

    pub fn with_configuration_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(Configuration) + Send + Sync + 'static,
    {
        self.on_configuration_changed = Some(Box::new(listener));
        self
    }

    /// Builds the engine around the application's scene and painter.
    pub fn build(self, scene: Box<dyn Scene>, painter: Box<dyn Painter>) -> Engine {
        info!(
            "Building engine (repaint: {} Hz, animation: {} Hz, queue buffer: {})",
            self.repaint_rate, self.animation_rate, self.queue_capacity
        );

        let registry = QueueRegistry::with_capacity(self.queue_capacity);
        let queue = registry.queue::<PlatformEvent>();

        let mut driver = DriverLoop::new(Arc::clone(&queue), scene, painter)
            .with_repaint_rate(self.repaint_rate)
            .with_gesture_config(self.gesture)
            .with_lifecycle(self.lifecycle)
            .with_key_fallback(self.keys);
        if let Some(settings) = self.settings {
            driver = driver.with_settings(settings);
        }
        if let Some(listener) = self.on_configuration_changed {
            driver = driver.with_configuration_listener(listener);
        }

        Engine {
            registry,
            queue,
            driver,
            animations: AnimationScheduler::with_rate(self.animation_rate),
            title: self.title,
        }
    }
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Engine ==============================================================

/// Aetheric runtime.
///
/// Create via [`EngineBuilder`].
///
/// # Architecture
///
/// ```text
/// Engine (Main Thread)
///   ├─► DriverLoop (Dispatch Thread)
///   │     └─► Gestures, Keys, Lifecycle, Painting
///   │
///   ├─► AnimationScheduler (Animation Thread, while animations run)
///   │
///   └─► Platform (Event Loop)
///         └─► Window, Input
///
/// Communication: EventQueue<PlatformEvent>
/// ```
pub struct Engine {
    /// Owner of the platform event queue.
    registry: QueueRegistry,
    queue: Arc<EventQueue<PlatformEvent>>,
    driver: DriverLoop,
    animations: AnimationScheduler,
    title: String,
}

impl Engine {
    //--- Handles ----------------------------------------------------------

    /// Scheduler for the application's animations.
    pub fn animations(&self) -> AnimationScheduler {
        self.animations.clone()
    }

    /// Requests a repaint on the next repaint tick. Hand it to animation
    /// tick functions that change what is drawn.
    pub fn invalidator(&self) -> Invalidator {
        self.driver.invalidator()
    }

    /// Queues work to run in order with the widget handlers.
    pub fn callback_sender(&self) -> CallbackSender {
        self.driver.callback_sender()
    }

    /// Producer end of the platform event queue, for injecting events.
    pub fn event_queue(&self) -> Arc<EventQueue<PlatformEvent>> {
        Arc::clone(&self.queue)
    }

    //--- Execution --------------------------------------------------------

    /// Starts the runtime and blocks until the window closes.
    ///
    /// # Lifecycle
    ///
    /// 1. Spawns the dispatch thread
    /// 2. Runs the platform event loop (blocks here)
    /// 3. On exit: the registry closes its queues → the dispatch loop
    ///    drains and returns
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the event loop cannot run. The dispatch
    /// thread is still shut down before returning.
    ///
    /// # Panics
    ///
    /// Panics if the dispatch thread cannot be spawned.
    pub fn run(self) -> Result<(), PlatformError> {
        info!("Starting runtime");

        //--- 1. Spawn the dispatch thread ---------------------------------
        let driver = self.driver;
        let driver_handle = thread::Builder::new()
            .name("aetheric-driver".into())
            .spawn(move || driver.run())
            .expect("failed to spawn dispatch thread");
        info!("Dispatch thread spawned");

        //--- 2. Launch the platform subsystem -----------------------------
        let platform = Platform::new(Arc::clone(&self.queue), self.title);
        let result = platform.run();
        if let Err(e) = &result {
            error!("Platform error: {}", e);
        }
        info!("Platform event loop exited");

        //--- 3. Cleanup ---------------------------------------------------
        self.registry.reset();
        match driver_handle.join() {
            Ok(()) => info!("Dispatch thread terminated cleanly"),
            Err(e) => error!("Dispatch thread panicked: {:?}", e),
        }

        info!("Runtime shutdown complete");
        result
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
