//=========================================================================
// Animation
//=========================================================================
//
// Caller-owned animation handles and easing curves.
//
// Architecture:
//   Arc<Animation> (caller) ──start()──> AnimationScheduler
//                                          └─ Weak<Animation> + timing
//
// The scheduler never keeps a handle alive: dropping the last `Arc`
// stops the animation at the next tick.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::fmt;
use std::time::Duration;

//=== Module Declarations =================================================

mod scheduler;

//=== Public API ==========================================================

pub use scheduler::{AnimationScheduler, DEFAULT_ANIMATION_RATE};

/// Repeat count that never runs out.
pub const REPEAT_FOREVER: i32 = -1;

//=== Easing ==============================================================

/// Maps linear elapsed-time fraction (0.0..=1.0) to animation progress.
#[derive(Debug, Clone, Copy, Default)]
pub enum Easing {
    /// Starts slowly, accelerates through the middle, slows to the end.
    #[default]
    EaseInOut,

    /// Starts slowly and accelerates to the end.
    EaseIn,

    /// Starts at speed and slows to the end.
    EaseOut,

    /// Uniform progress.
    Linear,

    /// Caller-supplied curve.
    Custom(fn(f32) -> f32),
}

impl Easing {
    /// Applies the curve to `fraction`.
    pub fn transform(&self, fraction: f32) -> f32 {
        match self {
            Easing::EaseInOut => {
                if fraction <= 0.5 {
                    fraction * fraction * 2.0
                } else {
                    -1.0 + (4.0 - fraction * 2.0) * fraction
                }
            }
            Easing::EaseIn => fraction * fraction,
            Easing::EaseOut => fraction * (2.0 - fraction),
            Easing::Linear => fraction,
            Easing::Custom(curve) => curve(fraction),
        }
    }
}

//=== Animation ===========================================================

/// Tick callback invoked with eased progress in `0.0..=1.0`.
pub type TickFn = Box<dyn Fn(f32) + Send + Sync>;

/// A timed animation driven by the [`AnimationScheduler`].
///
/// `repeat_count` semantics:
/// - `0`: run one cycle (one forward pass, plus one reverse pass when
///   `auto_reverse` is set)
/// - `n > 0`: run `n` additional cycles
/// - [`REPEAT_FOREVER`]: never stop on its own
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use std::time::Duration;
/// use aetheric_runtime::core::animation::{Animation, Easing};
///
/// let fade = Arc::new(
///     Animation::new(Duration::from_millis(250), |progress| {
///         let _alpha = progress;
///     })
///     .with_curve(Easing::EaseOut)
///     .with_auto_reverse(true),
/// );
/// assert!(fade.auto_reverse);
/// ```
pub struct Animation {
    pub duration: Duration,
    pub auto_reverse: bool,
    pub curve: Easing,
    pub repeat_count: i32,
    pub tick: TickFn,
}

impl Animation {
    /// Creates a single-shot, ease-in-out animation.
    pub fn new<F>(duration: Duration, tick: F) -> Self
    where
        F: Fn(f32) + Send + Sync + 'static,
    {
        Self {
            duration,
            auto_reverse: false,
            curve: Easing::default(),
            repeat_count: 0,
            tick: Box::new(tick),
        }
    }

    pub fn with_curve(mut self, curve: Easing) -> Self {
        self.curve = curve;
        self
    }

    pub fn with_auto_reverse(mut self, auto_reverse: bool) -> Self {
        self.auto_reverse = auto_reverse;
        self
    }

    pub fn with_repeat_count(mut self, repeat_count: i32) -> Self {
        self.repeat_count = repeat_count;
        self
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("duration", &self.duration)
            .field("auto_reverse", &self.auto_reverse)
            .field("curve", &self.curve)
            .field("repeat_count", &self.repeat_count)
            .finish_non_exhaustive()
    }
}

//=========================================================================
// Tests
//=========================================================================
