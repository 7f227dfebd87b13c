//=========================================================================
// Driver Loop
//
// The single dispatch loop composing the event queue, the gesture
// recognizer and the painter.
//
// Responsibilities:
// - Wait on three sources: the repaint ticker, settings notifications and
//   the platform event queue
// - Dispatch platform events by kind (lifecycle, size, paint, touch, key)
// - Schedule paints and run them only when something changed
// - Hand widget handlers to the callback runner
//
// Architecture:
// ```text
//  OS callback threads                 Dispatch Thread
//  ┌──────────────────┐          ┌───────────────────────────────┐
//  │  Platform        │          │  select! {                    │
//  │   ↓ push()       │          │    repaint tick → PaintEvent  │
//  │  EventQueue ─────┼─────────>│    settings     → theme       │
//  └──────────────────┘          │    queue output → dispatch()  │
//                                │  }                            │
//                                │   ├─ GestureRecognizer        │
//                                │   ├─ Scene / Painter          │
//                                │   └─ CallbackRunner ──> handlers
//                                └───────────────────────────────┘
// ```
//
// Notes:
// The loop blocks only while waiting on its sources. It exits once the
// event queue has been closed and drained.
//
//=========================================================================

//=== Submodules ==========================================================

mod callbacks;
mod device;

//=== Standard Library Imports ============================================

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

//=== External Dependencies ===============================================

use crossbeam_channel::{never, select, tick, Receiver};
use log::{debug, info, trace};

//=== Internal Dependencies ===============================================

use crate::core::geometry::Position;
use crate::core::gesture::{GestureConfig, GestureRecognizer, TapHandlers};
use crate::core::input::{route_key, KeyFallback, KeySample};
use crate::core::platform_bridge::{
    Crossing, Hook, Lifecycle, LifecycleEvent, PaintEvent, PlatformEvent, SizeEvent, Stage,
    TouchPhase, TouchSample,
};
use crate::core::queue::{EventQueue, DEFAULT_BUFFER_CAPACITY};
use crate::core::scene::{ObjectRef, Painter, Scene};
use crate::core::settings::{Configuration, SettingsChange, ThemeVariant};

//=== Public API ==========================================================

pub use callbacks::{Callback, CallbackSender};
pub use device::DeviceMetrics;

use callbacks::CallbackRunner;

/// Default repaint ticker frequency in Hz.
pub const DEFAULT_REPAINT_RATE: f64 = 60.0;

//=== Invalidator =========================================================

/// Thread-safe request to repaint on the next repaint tick.
///
/// Animation ticks and background work call [`Invalidator::invalidate`];
/// the dispatch loop marks the scene dirty when it next wakes.
#[derive(Debug, Clone, Default)]
pub struct Invalidator {
    flag: Arc<AtomicBool>,
}

impl Invalidator {
    pub fn invalidate(&self) {
        self.flag.store(true, Ordering::Release);
    }

    fn take(&self) -> bool {
        self.flag.swap(false, Ordering::AcqRel)
    }
}

/// Listener for system configuration changes.
pub type ConfigurationListener = Arc<dyn Fn(Configuration) + Send + Sync>;

//=== DriverLoop ==========================================================

/// The dispatch loop. Build it, then call [`DriverLoop::run`] on a
/// dedicated thread.
pub struct DriverLoop {
    //--- Sources ----------------------------------------------------------
    queue: Arc<EventQueue<PlatformEvent>>,
    settings: Receiver<SettingsChange>,
    repaint_interval: Duration,
    invalidator: Invalidator,

    //--- Collaborators ----------------------------------------------------
    scene: Box<dyn Scene>,
    painter: Box<dyn Painter>,
    recognizer: GestureRecognizer,
    keys: KeyFallback,
    lifecycle: Lifecycle,
    on_configuration_changed: Option<ConfigurationListener>,

    //--- Handler Delivery -------------------------------------------------
    callbacks: CallbackRunner,
    handlers: TapHandlers,

    //--- Surface State ----------------------------------------------------
    device: DeviceMetrics,
    theme: ThemeVariant,
    context_live: bool,
    painter_ready: bool,
    paint_pending: bool,
}

impl DriverLoop {
    //--- Construction -----------------------------------------------------

    /// Creates a loop consuming `queue`, with default gesture thresholds,
    /// a 60 Hz repaint ticker and no settings source.
    pub fn new(
        queue: Arc<EventQueue<PlatformEvent>>,
        scene: Box<dyn Scene>,
        painter: Box<dyn Painter>,
    ) -> Self {
        let callbacks = CallbackRunner::new(DEFAULT_BUFFER_CAPACITY);
        let handlers = queued_handlers(&callbacks.sender());

        Self {
            queue,
            settings: never(),
            repaint_interval: Duration::from_secs_f64(1.0 / DEFAULT_REPAINT_RATE),
            invalidator: Invalidator::default(),
            scene,
            painter,
            recognizer: GestureRecognizer::default(),
            keys: KeyFallback::new(),
            lifecycle: Lifecycle::new(),
            on_configuration_changed: None,
            callbacks,
            handlers,
            device: DeviceMetrics::default(),
            theme: ThemeVariant::default(),
            context_live: false,
            painter_ready: false,
            paint_pending: false,
        }
    }

    /// Sets the repaint ticker frequency.
    ///
    /// # Panics
    ///
    /// Panics if `rate <= 0.0`.
    pub fn with_repaint_rate(mut self, rate: f64) -> Self {
        assert!(rate > 0.0, "Repaint rate must be positive, got {}", rate);
        self.repaint_interval = Duration::from_secs_f64(1.0 / rate);
        self
    }

    pub fn with_gesture_config(mut self, config: GestureConfig) -> Self {
        self.recognizer = GestureRecognizer::new(config);
        self
    }

    /// Source of settings notifications. A disconnected source is ignored
    /// from then on.
    pub fn with_settings(mut self, settings: Receiver<SettingsChange>) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_lifecycle(mut self, lifecycle: Lifecycle) -> Self {
        self.lifecycle = lifecycle;
        self
    }

    pub fn with_key_fallback(mut self, keys: KeyFallback) -> Self {
        self.keys = keys;
        self
    }

    /// Called on the callback thread when the system theme flips.
    pub fn with_configuration_listener<F>(mut self, listener: F) -> Self
    where
        F: Fn(Configuration) + Send + Sync + 'static,
    {
        self.on_configuration_changed = Some(Arc::new(listener));
        self
    }

    //--- Handles ----------------------------------------------------------

    pub fn invalidator(&self) -> Invalidator {
        self.invalidator.clone()
    }

    /// Producer handle for work that must run with the widget handlers.
    pub fn callback_sender(&self) -> CallbackSender {
        self.callbacks.sender()
    }

    //--- Execution --------------------------------------------------------

    /// Runs until the event queue is closed and drained, then waits for
    /// every queued handler to finish.
    pub fn run(mut self) {
        info!(target: "driver", "Dispatch loop started");

        let ticker = tick(self.repaint_interval);
        let output = self.queue.output().clone();
        let mut settings = self.settings.clone();
        let mut dispatched: u64 = 0;

        loop {
            let mut settings_gone = false;

            select! {
                recv(ticker) -> _ => self.on_repaint_tick(),
                recv(settings) -> change => match change {
                    Ok(change) => self.apply_settings(change),
                    Err(_) => settings_gone = true,
                },
                recv(output) -> event => match event {
                    Ok(event) => {
                        dispatched += 1;
                        self.dispatch(event);
                    }
                    Err(_) => break,
                },
            }

            if settings_gone {
                debug!(target: "driver", "Settings source disconnected");
                settings = never();
            }
        }

        self.recognizer.flush();
        self.callbacks.shutdown();
        info!(target: "driver", "Dispatch loop exited after {} events", dispatched);
    }

    //--- Dispatch ---------------------------------------------------------

    fn dispatch(&mut self, event: PlatformEvent) {
        match event {
            PlatformEvent::Lifecycle(event) => self.handle_lifecycle(event),
            PlatformEvent::Size(event) => self.handle_size(event),
            PlatformEvent::Paint(event) => self.handle_paint(event),
            PlatformEvent::Touch(sample) => self.handle_touch(sample),
            PlatformEvent::Key(sample) => self.handle_key(sample),
        }
    }

    fn handle_lifecycle(&mut self, event: LifecycleEvent) {
        debug!(target: "driver", "Lifecycle {:?} -> {:?}", event.from, event.to);

        match event.crosses(Stage::Visible) {
            Crossing::On => {
                self.context_live = true;
                self.fire(self.lifecycle.on_started.clone());
                self.scene.mark_dirty();
                self.request_paint();
            }
            Crossing::Off => {
                self.fire(self.lifecycle.on_stopped.clone());
                self.context_live = false;
            }
            Crossing::None => {}
        }

        match event.crosses(Stage::Focused) {
            Crossing::On => self.fire(self.lifecycle.on_entered_foreground.clone()),
            Crossing::Off => self.fire(self.lifecycle.on_exited_foreground.clone()),
            Crossing::None => {}
        }
    }

    fn handle_size(&mut self, event: SizeEvent) {
        if event.width_px == 0 {
            debug!(target: "driver", "Ignoring size event without width");
            return;
        }

        self.device = DeviceMetrics::from_size_event(&event);
        self.set_theme(ThemeVariant::from_dark_mode(event.dark_mode));
        self.scene.mark_dirty();

        trace!(
            target: "driver",
            "Surface {}x{} px @ {}x",
            event.width_px,
            event.height_px,
            self.device.scale
        );
    }

    fn handle_paint(&mut self, event: PaintEvent) {
        if !event.external {
            self.paint_pending = false;
        }
        if !self.context_live || event.external {
            return;
        }

        if !self.painter_ready {
            self.painter.init();
            self.painter_ready = true;
        }

        if self.painter.free_dirty_textures() == 0 && !self.scene.check_dirty_and_clear() {
            return;
        }

        let frame = self.device.size;
        self.scene.resize(frame);
        self.scene
            .set_safe_area(self.device.safe_origin, self.device.safe_size);

        let painter = &mut self.painter;
        self.scene.walk(&mut |object: &ObjectRef, position: Position| {
            painter.paint(object, position, frame)
        });
        self.painter.publish();

        trace!(target: "driver", "Frame published");
    }

    fn handle_touch(&mut self, sample: TouchSample) {
        let position = self.device.unscale(sample.position);
        let id = sample.sequence;

        match sample.phase {
            TouchPhase::Begin => self.recognizer.tap_down(position, id, self.scene.as_mut()),
            TouchPhase::Move => {
                let sender = self.callbacks.sender();
                self.recognizer
                    .tap_move(position, id, self.scene.as_mut(), |object, event| {
                        sender.queue(move || object.dragged(&event));
                    });
            }
            TouchPhase::End => {
                self.recognizer
                    .tap_up(position, id, self.scene.as_mut(), &self.handlers)
            }
        }
    }

    fn handle_key(&mut self, sample: KeySample) {
        route_key(self.scene.as_mut(), &sample, &self.keys);
    }

    //--- Repaint ----------------------------------------------------------

    fn on_repaint_tick(&mut self) {
        if self.invalidator.take() {
            self.scene.mark_dirty();
        }
        self.request_paint();
    }

    /// Queues an internal paint unless one is outstanding.
    fn request_paint(&mut self) {
        if self.paint_pending {
            return;
        }
        self.paint_pending = true;
        self.queue.push(PlatformEvent::Paint(PaintEvent { external: false }));
    }

    //--- Settings ---------------------------------------------------------

    fn apply_settings(&mut self, change: SettingsChange) {
        debug!(target: "driver", "Applying settings (theme: {:?})", change.theme);
        self.painter.clear_caches();
        self.scene.apply_theme(change.theme);
        self.scene.mark_dirty();
    }

    fn set_theme(&mut self, variant: ThemeVariant) {
        if variant != self.theme {
            if let Some(listener) = self.on_configuration_changed.clone() {
                self.callbacks.sender().queue(move || {
                    listener(Configuration {
                        system_theme: variant,
                    })
                });
            }
        }
        self.theme = variant;
    }

    //--- Helpers ----------------------------------------------------------

    fn fire(&self, hook: Option<Hook>) {
        if let Some(hook) = hook {
            self.callbacks.sender().queue(move || hook());
        }
    }
}

impl fmt::Debug for DriverLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverLoop")
            .field("repaint_interval", &self.repaint_interval)
            .field("device", &self.device)
            .field("theme", &self.theme)
            .field("context_live", &self.context_live)
            .finish_non_exhaustive()
    }
}

/// Tap outcomes that run on the callback thread.
fn queued_handlers(sender: &CallbackSender) -> TapHandlers {
    let (tap, secondary, double, drag_end) =
        (sender.clone(), sender.clone(), sender.clone(), sender.clone());

    TapHandlers::new(
        move |object, event| tap.queue(move || object.tapped(&event)),
        move |object, event| secondary.queue(move || object.tapped_secondary(&event)),
        move |object, event| double.queue(move || object.double_tapped(&event)),
        move |object| drag_end.queue(move || object.drag_end()),
    )
}

//=========================================================================
// Tests
//=========================================================================
