//=========================================================================
// Animation Scheduler
//=========================================================================
//
// Ticks registered animations at a fixed cadence on a lazily started
// worker thread.
//
// Architecture:
//   start() ──> pending (or active, if idle) ─┐
//                                             │  RwLock<AnimationLists>
//   ticker ──> snapshot(active) ──> tick each ┘
//                  │
//                  └─> active = survivors + pending; pending = []
//
// The sweep ticks a snapshot taken under the lock and releases the lock
// while callbacks run, so `start()`/`stop()` may be called from inside a
// tick callback. `stop()` flips an atomic flag the sweep checks before
// each tick; it never interrupts a tick already running.
//
// The worker exits when the active list empties. That transition and the
// `running = false` write happen under the same write lock, so a
// concurrent `start()` either lands in the final merge or sees the
// scheduler idle and spawns a new worker.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::thread;
use std::time::{Duration, Instant};

//=== External Dependencies ===============================================

use crossbeam_channel::tick;
use log::{debug, trace};

//=== Internal Dependencies ===============================================

use super::Animation;

//=== Constants ===========================================================

/// Default cadence in ticks per second.
pub const DEFAULT_ANIMATION_RATE: f64 = 60.0;

//=== RunningAnimation ====================================================

/// Timing state owned by the ticking thread.
struct Timing {
    start: Instant,
    end: Instant,
    total_millis: i64,
    repeats_left: i32,
    reverse: bool,
}

/// Scheduler-side wrapper around a caller's handle.
struct RunningAnimation {
    handle: Weak<Animation>,
    stopped: AtomicBool,
    timing: Mutex<Timing>,
}

impl RunningAnimation {
    fn new(animation: &Arc<Animation>) -> Self {
        let start = Instant::now();
        Self {
            handle: Arc::downgrade(animation),
            stopped: AtomicBool::new(false),
            timing: Mutex::new(Timing {
                start,
                end: start + animation.duration,
                total_millis: animation.duration.as_millis() as i64,
                repeats_left: animation.repeat_count,
                reverse: false,
            }),
        }
    }

    fn is_for(&self, animation: &Arc<Animation>) -> bool {
        std::ptr::eq(self.handle.as_ptr(), Arc::as_ptr(animation))
    }

    fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Advances one frame. Returns false once the animation is finished.
    fn tick(&self, now: Instant) -> bool {
        let Some(animation) = self.handle.upgrade() else {
            trace!(target: "animation", "Animation handle dropped, removing");
            return false;
        };
        let mut timing = self.timing.lock().unwrap_or_else(PoisonError::into_inner);

        if now > timing.end {
            if timing.reverse {
                (animation.tick)(0.0);
                if timing.repeats_left == 0 {
                    return false;
                }
                timing.reverse = false;
            } else {
                (animation.tick)(1.0);
                if animation.auto_reverse {
                    timing.reverse = true;
                }
            }

            if !timing.reverse {
                if timing.repeats_left == 0 {
                    return false;
                }
                if timing.repeats_left > 0 {
                    timing.repeats_left -= 1;
                }
            }

            timing.start = now;
            timing.end = now + animation.duration;
            return true;
        }

        let elapsed_millis = now.duration_since(timing.start).as_millis() as i64;
        let fraction = if timing.total_millis > 0 {
            elapsed_millis as f32 / timing.total_millis as f32
        } else {
            1.0
        };

        if timing.reverse {
            (animation.tick)(animation.curve.transform(1.0 - fraction));
        } else {
            (animation.tick)(animation.curve.transform(fraction));
        }

        true
    }
}

//=== AnimationLists ======================================================

#[derive(Default)]
struct AnimationLists {
    active: Vec<Arc<RunningAnimation>>,
    pending: Vec<Arc<RunningAnimation>>,
    running: bool,
}

struct SchedulerShared {
    lists: RwLock<AnimationLists>,
    interval: Duration,
}

impl SchedulerShared {
    fn read(&self) -> RwLockReadGuard<'_, AnimationLists> {
        self.lists.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, AnimationLists> {
        self.lists.write().unwrap_or_else(PoisonError::into_inner)
    }
}

//=== AnimationScheduler ==================================================

/// Fixed-cadence animation runner.
///
/// Cheap to clone; clones share the same lists and worker.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use std::time::Duration;
/// use aetheric_runtime::core::animation::{Animation, AnimationScheduler};
///
/// let scheduler = AnimationScheduler::new();
/// let pulse = Arc::new(Animation::new(Duration::from_millis(300), |p| {
///     println!("progress {p}");
/// }));
///
/// scheduler.start(&pulse);
/// // ...
/// scheduler.stop(&pulse);
/// ```
#[derive(Clone)]
pub struct AnimationScheduler {
    shared: Arc<SchedulerShared>,
}

impl AnimationScheduler {
    //--- Construction -----------------------------------------------------

    /// Creates an idle scheduler ticking at [`DEFAULT_ANIMATION_RATE`].
    pub fn new() -> Self {
        Self::with_rate(DEFAULT_ANIMATION_RATE)
    }

    /// Creates an idle scheduler ticking `rate` times per second.
    ///
    /// # Panics
    ///
    /// Panics if `rate <= 0.0`.
    pub fn with_rate(rate: f64) -> Self {
        assert!(rate > 0.0, "Animation rate must be positive, got {}", rate);
        Self {
            shared: Arc::new(SchedulerShared {
                lists: RwLock::new(AnimationLists::default()),
                interval: Duration::from_secs_f64(1.0 / rate),
            }),
        }
    }

    //--- Registration -----------------------------------------------------

    /// Registers `animation` and starts ticking it.
    ///
    /// Spawns the worker if the scheduler is idle. Safe to call from any
    /// thread, including from inside a tick callback.
    pub fn start(&self, animation: &Arc<Animation>) {
        let running = Arc::new(RunningAnimation::new(animation));
        let mut lists = self.shared.write();

        if lists.running {
            lists.pending.push(running);
            return;
        }

        lists.running = true;
        lists.active.push(running);
        drop(lists);

        debug!(target: "animation", "Starting animation worker");
        let shared = Arc::clone(&self.shared);
        thread::Builder::new()
            .name("aetheric-animation".into())
            .spawn(move || run_animations(shared))
            .expect("failed to spawn animation worker");
    }

    /// Stops `animation` and removes it from future sweeps.
    ///
    /// A tick already in progress completes. Stopping an animation that is
    /// not registered (never started, finished, or already stopped) is a
    /// no-op.
    pub fn stop(&self, animation: &Arc<Animation>) {
        let mut lists = self.shared.write();

        if remove_matching(&mut lists.active, animation) {
            return;
        }
        remove_matching(&mut lists.pending, animation);
    }

    //--- Queries ----------------------------------------------------------

    /// Number of animations in the active list.
    pub fn active_count(&self) -> usize {
        self.shared.read().active.len()
    }

    /// Number of animations waiting to join the next sweep.
    pub fn pending_count(&self) -> usize {
        self.shared.read().pending.len()
    }

    /// True while the worker thread is alive.
    pub fn is_running(&self) -> bool {
        self.shared.read().running
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Drops entries for `animation` from `list`, flagging them stopped.
fn remove_matching(list: &mut Vec<Arc<RunningAnimation>>, animation: &Arc<Animation>) -> bool {
    let mut found = false;
    list.retain(|item| {
        if item.is_for(animation) {
            item.stop();
            found = true;
            false
        } else {
            true
        }
    });
    found
}

//=== Worker ==============================================================

fn run_animations(shared: Arc<SchedulerShared>) {
    let ticker = tick(shared.interval);

    loop {
        if ticker.recv().is_err() {
            break;
        }

        let snapshot: Vec<Arc<RunningAnimation>> = shared.read().active.clone();
        let now = Instant::now();

        let survivors: Vec<Arc<RunningAnimation>> = snapshot
            .into_iter()
            .filter(|item| !item.is_stopped() && item.tick(now))
            .collect();

        let mut lists = shared.write();
        let pending = std::mem::take(&mut lists.pending);
        lists.active = survivors;
        lists.active.extend(pending);

        if lists.active.is_empty() {
            lists.running = false;
            debug!(target: "animation", "No active animations, worker exiting");
            return;
        }
    }

    shared.write().running = false;
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::animation::{Easing, REPEAT_FOREVER};
    use crossbeam_channel::{unbounded, Sender};
    use std::sync::atomic::AtomicUsize;

    fn wait_until(timeout: Duration, condition: impl Fn() -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if condition() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        condition()
    }

    fn reporting(duration: Duration, tx: Sender<f32>) -> Arc<Animation> {
        Arc::new(Animation::new(duration, move |progress| {
            let _ = tx.send(progress);
        }))
    }

    // Maps progress ticks below 0.5 so only cycle boundaries report 1.0.
    fn halved(v: f32) -> f32 {
        v * 0.5
    }

    #[test]
    fn start_ticks_animation() {
        let scheduler = AnimationScheduler::new();
        let (tx, rx) = unbounded();
        let anim = reporting(Duration::from_millis(100), tx);

        scheduler.start(&anim);

        let progress = rx
            .recv_timeout(Duration::from_millis(500))
            .expect("animation was not ticked");
        assert!(progress >= 0.0);
        assert!(scheduler.is_running());
    }

    #[test]
    fn stop_removes_from_active_list() {
        let scheduler = AnimationScheduler::new();
        let (tx, rx) = unbounded();
        let anim = reporting(Duration::from_secs(10), tx);

        scheduler.start(&anim);
        rx.recv_timeout(Duration::from_secs(1)).expect("animation was not ticked");

        scheduler.stop(&anim);
        assert_eq!(scheduler.active_count(), 0);
        assert!(wait_until(Duration::from_secs(1), || !scheduler.is_running()));
    }

    #[test]
    fn stop_before_first_tick_and_twice_is_silent() {
        let scheduler = AnimationScheduler::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let anim = Arc::new(Animation::new(Duration::from_secs(1), move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        scheduler.start(&anim);
        scheduler.stop(&anim);
        scheduler.stop(&anim);

        thread::sleep(Duration::from_millis(100));
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn stop_of_unknown_animation_is_noop() {
        let scheduler = AnimationScheduler::new();
        let anim = Arc::new(Animation::new(Duration::from_secs(1), |_| {}));

        scheduler.stop(&anim);
        assert_eq!(scheduler.active_count(), 0);
        assert!(!scheduler.is_running());
    }

    #[test]
    fn stop_from_inside_tick() {
        let scheduler = AnimationScheduler::new();
        let (done_tx, done_rx) = unbounded();

        // First one lands in the active list directly.
        let idle = Arc::new(Animation::new(Duration::from_secs(1), |_| {}));
        scheduler.start(&idle);
        scheduler.stop(&idle);

        let mut handles = Vec::new();
        for _ in 0..10 {
            let sched = scheduler.clone();
            let done = done_tx.clone();
            let anim = Arc::new_cyclic(|me: &Weak<Animation>| {
                let me = me.clone();
                Animation::new(Duration::from_secs(1), move |_| {
                    if let Some(me) = me.upgrade() {
                        sched.stop(&me);
                    }
                    let _ = done.send(());
                })
            });
            scheduler.start(&anim);
            handles.push(anim);
        }

        // Registered while running: added then removed from pending.
        let late = Arc::new(Animation::new(Duration::from_secs(1), |_| {}));
        scheduler.start(&late);
        scheduler.stop(&late);

        for _ in 0..10 {
            done_rx
                .recv_timeout(Duration::from_secs(2))
                .expect("self-stopping animation never ticked");
        }

        thread::sleep(Duration::from_millis(100));
        assert!(done_rx.try_recv().is_err(), "animation ticked after stopping itself");
        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn repeat_count_runs_extra_cycles() {
        let scheduler = AnimationScheduler::new();
        let (tx, rx) = unbounded();
        let anim = Arc::new(
            Animation::new(Duration::from_millis(30), move |p| {
                let _ = tx.send(p);
            })
            .with_curve(Easing::Custom(halved))
            .with_repeat_count(2),
        );

        scheduler.start(&anim);
        assert!(wait_until(Duration::from_secs(2), || scheduler.active_count() == 0
            && !scheduler.is_running()));

        let completions = rx.try_iter().filter(|p| *p == 1.0).count();
        assert_eq!(completions, 3);
    }

    #[test]
    fn auto_reverse_ends_on_zero() {
        let scheduler = AnimationScheduler::new();
        let (tx, rx) = unbounded();
        let anim = Arc::new(
            Animation::new(Duration::from_millis(30), move |p| {
                let _ = tx.send(p);
            })
            .with_curve(Easing::Custom(halved))
            .with_auto_reverse(true),
        );

        scheduler.start(&anim);
        assert!(wait_until(Duration::from_secs(2), || !scheduler.is_running()));

        let values: Vec<f32> = rx.try_iter().collect();
        assert_eq!(values.iter().filter(|p| **p == 1.0).count(), 1);
        assert_eq!(values.last().copied(), Some(0.0));
    }

    #[test]
    fn repeat_forever_keeps_running() {
        let scheduler = AnimationScheduler::new();
        let (tx, rx) = unbounded();
        let anim = Arc::new(
            Animation::new(Duration::from_millis(10), move |p| {
                let _ = tx.send(p);
            })
            .with_curve(Easing::Custom(halved))
            .with_repeat_count(REPEAT_FOREVER),
        );

        scheduler.start(&anim);
        thread::sleep(Duration::from_millis(300));

        assert_eq!(scheduler.active_count(), 1);
        assert!(rx.try_iter().filter(|p| *p == 1.0).count() >= 2);

        scheduler.stop(&anim);
        assert!(wait_until(Duration::from_secs(1), || !scheduler.is_running()));
    }

    #[test]
    fn dropped_handle_is_removed() {
        let scheduler = AnimationScheduler::new();
        let anim = Arc::new(Animation::new(Duration::from_secs(10), |_| {}));

        scheduler.start(&anim);
        drop(anim);

        assert!(wait_until(Duration::from_secs(1), || !scheduler.is_running()));
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn restarts_after_going_idle() {
        let scheduler = AnimationScheduler::new();
        let (tx, rx) = unbounded();

        let first = reporting(Duration::from_millis(10), tx.clone());
        scheduler.start(&first);
        assert!(wait_until(Duration::from_secs(1), || !scheduler.is_running()));
        while rx.try_recv().is_ok() {}

        let second = reporting(Duration::from_millis(10), tx);
        scheduler.start(&second);
        rx.recv_timeout(Duration::from_secs(1))
            .expect("scheduler did not restart its worker");
    }

    #[test]
    #[should_panic(expected = "Animation rate must be positive")]
    fn zero_rate_panics() {
        AnimationScheduler::with_rate(0.0);
    }
}
