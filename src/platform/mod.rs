//=========================================================================
// Platform Subsystem
//
// Bridges Winit (OS-level events) with the dispatch loop through the
// unbounded event queue.
//
// Architecture:
// ```text
//  Main Thread:                     Dispatch Thread:
//  ┌──────────────────────────┐    ┌──────────────────┐
//  │  Winit Event Loop        │    │  DriverLoop      │
//  │   ↓                      │    │   ├─ Gestures    │
//  │  InputProcessor          │    │   ├─ Keys        │
//  │   ├─ Converts Winit      │    │   ├─ Lifecycle   │
//  │   └─ Tracks modifiers    │    │   └─ Painting    │
//  │      and cursor          │    │                  │
//  │   ↓                      │    └──────────────────┘
//  │  EventQueue::push ───────┼─────────────┘
//  └──────────────────────────┘    PlatformEvent
// ```
//
// Key Design Decisions:
// - **Push per event**: every sample is queued as it arrives. The queue
//   never blocks, so the OS callback returns immediately
// - **Sticky modifiers**: Modifier state persists across events until
//   explicitly changed (matches platform behavior)
// - **Lifecycle from window state**: creation, occlusion, focus and
//   suspend/resume are folded into one ordered stage
// - **Main thread requirement**: Winit mandates main thread on macOS/iOS,
//   so this runs on the thread that called `Engine::run()`
//
//=========================================================================

//=== Submodules ==========================================================

mod event_mapper;
mod input_processor;

//=== Standard Library Imports ============================================

use std::sync::Arc;

//=== External Crates =====================================================

use log::*;
use winit::{
    application::ApplicationHandler,
    dpi::{LogicalSize, PhysicalSize},
    event::WindowEvent,
    event_loop::{ActiveEventLoop, EventLoop},
    window::{Theme, Window, WindowAttributes, WindowId},
};

//=== Internal Imports ====================================================

use crate::core::platform_bridge::{
    Insets, LifecycleEvent, PaintEvent, PlatformError, PlatformEvent, SizeEvent, Stage,
};
use crate::core::queue::EventQueue;
use input_processor::InputProcessor;

//=== Platform ============================================================

/// Window manager and event producer.
///
/// Runs on the main thread (Winit requirement on macOS/iOS) and pushes
/// every translated event into the shared queue.
///
/// # Lifecycle
///
/// 1. **Construction**: `Platform::new(queue, title)`
/// 2. **Execution**: `platform.run()` blocks in the Winit event loop
/// 3. **Shutdown**: the window closes → final `Dead` transition → the
///    queue is closed, which ends the dispatch loop
pub(crate) struct Platform {
    /// OS window handle (None until `resumed()` called).
    window: Option<Window>,

    /// Intake of the dispatch loop.
    queue: Arc<EventQueue<PlatformEvent>>,

    /// Converts Winit input to key and touch samples.
    input_processor: InputProcessor,

    title: String,

    /// Last stage reported to the dispatch loop.
    stage: Stage,

    dark_mode: bool,
}

impl Platform {
    //--- Construction -----------------------------------------------------

    /// Creates a platform producing into `queue`.
    ///
    /// Does not create the window yet; that happens lazily in `resumed()`.
    pub fn new(queue: Arc<EventQueue<PlatformEvent>>, title: impl Into<String>) -> Self {
        info!(target: "platform", "Platform subsystem initialized");
        Self {
            window: None,
            queue,
            input_processor: InputProcessor::new(),
            title: title.into(),
            stage: Stage::Dead,
            dark_mode: false,
        }
    }

    //--- Execution --------------------------------------------------------

    /// Runs the Winit event loop until the window closes.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError`] if the event loop cannot be created or
    /// stops with an error.
    ///
    /// # Panics
    ///
    /// Panics if called off the main thread (macOS/iOS Winit requirement).
    pub fn run(mut self) -> Result<(), PlatformError> {
        debug!(target: "platform", "Starting Winit event loop");

        let event_loop = EventLoop::new().map_err(PlatformError::EventLoopCreation)?;

        let result = event_loop
            .run_app(&mut self)
            .map_err(PlatformError::EventLoopExecution);

        // Already done in `exiting()` unless the loop failed early.
        self.shutdown();
        result
    }

    //--- Internal Helpers -------------------------------------------------

    fn push(&self, event: PlatformEvent) {
        if self.queue.is_closed() {
            trace!(target: "platform", "Queue closed, dropping {:?}", event);
            return;
        }
        self.queue.push(event);
    }

    /// Reports a move to `to` unless already there.
    fn transition(&mut self, to: Stage) {
        if self.stage == to {
            return;
        }
        let event = LifecycleEvent::new(self.stage, to);
        debug!(target: "platform", "Lifecycle {:?} -> {:?}", event.from, event.to);
        self.stage = to;
        self.push(PlatformEvent::Lifecycle(event));
    }

    fn send_size(&self, size: PhysicalSize<u32>, scale_factor: f64) {
        self.push(PlatformEvent::Size(SizeEvent {
            width_px: size.width,
            height_px: size.height,
            pixels_per_pt: scale_factor as f32,
            insets: Insets::default(),
            dark_mode: self.dark_mode,
        }));
    }

    fn send_current_size(&self) {
        if let Some(window) = &self.window {
            self.send_size(window.inner_size(), window.scale_factor());
        }
    }

    /// Final `Dead` transition, then closes the queue.
    fn shutdown(&mut self) {
        if self.queue.is_closed() {
            return;
        }
        self.transition(Stage::Dead);
        self.queue.close();
        info!(target: "platform", "Event queue closed");
    }

    //--- Test Accessors ---------------------------------------------------

    #[cfg(test)]
    pub(crate) fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }
}

//=== Winit Integration ===================================================

impl ApplicationHandler for Platform {
    /// Called when app becomes active (startup or mobile resume).
    ///
    /// Creates the window if it doesn't exist yet. On mobile, this may be
    /// called multiple times (suspend/resume cycle).
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            debug!(target: "platform", "Window already exists (mobile resume?)");
            self.transition(Stage::Visible);
            return;
        }

        let attrs = WindowAttributes::default()
            .with_title(self.title.clone())
            .with_inner_size(LogicalSize::new(800, 600));

        match event_loop.create_window(attrs) {
            Ok(window) => {
                info!(
                    target: "platform",
                    "Window created: {}x{} @ {}x DPI",
                    window.inner_size().width,
                    window.inner_size().height,
                    window.scale_factor()
                );
                self.dark_mode = window.theme() == Some(Theme::Dark);
                self.window = Some(window);

                self.transition(Stage::Alive);
                self.send_current_size();
                self.transition(Stage::Visible);
            }
            Err(e) => {
                error!(target: "platform", "Window creation failed: {}", e);
                self.shutdown();
                event_loop.exit();
            }
        }
    }

    fn suspended(&mut self, _event_loop: &ActiveEventLoop) {
        self.transition(Stage::Alive);
    }

    /// Handles per-window events.
    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!(target: "platform", "Window close requested");
                event_loop.exit();
            }

            //--- Surface --------------------------------------------------
            WindowEvent::Resized(size) => {
                let scale = self.window.as_ref().map_or(1.0, |w| w.scale_factor());
                self.send_size(size, scale);
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(window) = &self.window {
                    self.send_size(window.inner_size(), scale_factor);
                }
            }

            WindowEvent::ThemeChanged(theme) => {
                self.dark_mode = theme == Theme::Dark;
                self.send_current_size();
            }

            WindowEvent::RedrawRequested => {
                self.push(PlatformEvent::Paint(PaintEvent { external: true }));
            }

            //--- Lifecycle ------------------------------------------------
            WindowEvent::Focused(true) => self.transition(Stage::Focused),
            WindowEvent::Focused(false) => self.transition(Stage::Visible),
            WindowEvent::Occluded(true) => self.transition(Stage::Alive),
            WindowEvent::Occluded(false) => self.transition(Stage::Visible),

            //--- Input ----------------------------------------------------
            WindowEvent::ModifiersChanged(state) => {
                trace!(target: "platform::input", "Modifiers changed: {:?}", state);
                self.input_processor.update_modifiers(state.state());
            }

            WindowEvent::KeyboardInput { event: key_event, .. } => {
                let sample = self.input_processor.process_key(
                    key_event.physical_key,
                    key_event.text.as_deref(),
                    key_event.state,
                );
                self.push(PlatformEvent::Key(sample));
            }

            WindowEvent::CursorMoved { position, .. } => {
                let sample = self
                    .input_processor
                    .process_cursor_move(position.x as f32, position.y as f32);
                if let Some(sample) = sample {
                    self.push(PlatformEvent::Touch(sample));
                }
            }

            WindowEvent::CursorLeft { .. } => {
                if let Some(sample) = self.input_processor.process_cursor_left() {
                    self.push(PlatformEvent::Touch(sample));
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if let Some(sample) = self.input_processor.process_mouse_button(button, state) {
                    self.push(PlatformEvent::Touch(sample));
                }
            }

            WindowEvent::Touch(touch) => {
                let sample = self.input_processor.process_touch(
                    touch.phase,
                    touch.location.x as f32,
                    touch.location.y as f32,
                    touch.id,
                );
                self.push(PlatformEvent::Touch(sample));
            }

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        debug!(target: "platform", "Event loop exiting");
        self.shutdown();
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn next(queue: &EventQueue<PlatformEvent>) -> PlatformEvent {
        queue
            .output()
            .recv_timeout(Duration::from_secs(2))
            .expect("event expected")
    }

    #[test]
    fn platform_creation() {
        let queue = Arc::new(EventQueue::new());
        let platform = Platform::new(queue, "test");
        assert!(platform.window().is_none(), "Window should be created lazily");
    }

    #[test]
    fn transitions_are_reported_once() {
        let queue = Arc::new(EventQueue::new());
        let mut platform = Platform::new(Arc::clone(&queue), "test");

        platform.transition(Stage::Visible);
        platform.transition(Stage::Visible);
        platform.transition(Stage::Focused);

        assert_eq!(
            next(&queue),
            PlatformEvent::Lifecycle(LifecycleEvent::new(Stage::Dead, Stage::Visible))
        );
        assert_eq!(
            next(&queue),
            PlatformEvent::Lifecycle(LifecycleEvent::new(Stage::Visible, Stage::Focused))
        );
        assert!(queue.output().try_recv().is_err());
    }

    #[test]
    fn size_events_carry_scale_and_theme() {
        let queue = Arc::new(EventQueue::new());
        let mut platform = Platform::new(Arc::clone(&queue), "test");
        platform.dark_mode = true;

        platform.send_size(PhysicalSize::new(1600, 1200), 2.0);

        match next(&queue) {
            PlatformEvent::Size(size) => {
                assert_eq!(size.width_px, 1600);
                assert_eq!(size.height_px, 1200);
                assert_eq!(size.pixels_per_pt, 2.0);
                assert!(size.dark_mode);
            }
            other => panic!("Expected Size event, got {:?}", other),
        }
    }

    #[test]
    fn shutdown_reports_dead_and_closes_queue() {
        let queue = Arc::new(EventQueue::new());
        let mut platform = Platform::new(Arc::clone(&queue), "test");

        platform.transition(Stage::Focused);
        platform.shutdown();
        platform.shutdown();

        let events: Vec<_> = queue.output().iter().collect();
        assert_eq!(
            events,
            vec![
                PlatformEvent::Lifecycle(LifecycleEvent::new(Stage::Dead, Stage::Focused)),
                PlatformEvent::Lifecycle(LifecycleEvent::new(Stage::Focused, Stage::Dead)),
            ]
        );
        assert!(queue.is_closed());
    }

    #[test]
    fn push_after_close_is_dropped() {
        let queue = Arc::new(EventQueue::new());
        let platform = Platform::new(Arc::clone(&queue), "test");
        queue.close();

        platform.push(PlatformEvent::Paint(PaintEvent { external: true }));

        assert!(queue.output().iter().next().is_none());
    }
}
