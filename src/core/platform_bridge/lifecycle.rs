//=========================================================================
// Application Lifecycle
//=========================================================================
//
// Ordered lifecycle stages and the hooks fired when a transition crosses
// the visible or focused boundary.
//
//   Dead < Alive < Visible < Focused
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::fmt;
use std::sync::Arc;

//=== Stage ===============================================================

/// How far the application is along its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Stage {
    /// Not started or already torn down.
    #[default]
    Dead,

    /// Running but without a visible surface.
    Alive,

    /// On screen.
    Visible,

    /// On screen and receiving input.
    Focused,
}

/// Direction in which a transition crosses a stage boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    On,
    Off,
    None,
}

/// A lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleEvent {
    pub from: Stage,
    pub to: Stage,
}

impl LifecycleEvent {
    pub fn new(from: Stage, to: Stage) -> Self {
        Self { from, to }
    }

    /// Whether this transition reaches or leaves `stage`.
    pub fn crosses(&self, stage: Stage) -> Crossing {
        if self.from < stage && self.to >= stage {
            Crossing::On
        } else if self.from >= stage && self.to < stage {
            Crossing::Off
        } else {
            Crossing::None
        }
    }
}

//=== Lifecycle ===========================================================

/// A lifecycle hook. Runs on the callback thread.
pub type Hook = Arc<dyn Fn() + Send + Sync>;

/// Application hooks fired by the dispatch loop.
#[derive(Clone, Default)]
pub struct Lifecycle {
    pub(crate) on_started: Option<Hook>,
    pub(crate) on_stopped: Option<Hook>,
    pub(crate) on_entered_foreground: Option<Hook>,
    pub(crate) on_exited_foreground: Option<Hook>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Called when the application becomes visible.
    pub fn set_on_started<F: Fn() + Send + Sync + 'static>(&mut self, hook: F) {
        self.on_started = Some(Arc::new(hook));
    }

    /// Called when the application stops being visible.
    pub fn set_on_stopped<F: Fn() + Send + Sync + 'static>(&mut self, hook: F) {
        self.on_stopped = Some(Arc::new(hook));
    }

    pub fn set_on_entered_foreground<F: Fn() + Send + Sync + 'static>(&mut self, hook: F) {
        self.on_entered_foreground = Some(Arc::new(hook));
    }

    pub fn set_on_exited_foreground<F: Fn() + Send + Sync + 'static>(&mut self, hook: F) {
        self.on_exited_foreground = Some(Arc::new(hook));
    }
}

impl fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("on_started", &self.on_started.is_some())
            .field("on_stopped", &self.on_stopped.is_some())
            .field("on_entered_foreground", &self.on_entered_foreground.is_some())
            .field("on_exited_foreground", &self.on_exited_foreground.is_some())
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================
