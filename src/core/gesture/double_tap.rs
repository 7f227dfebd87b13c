//=========================================================================
// Double-Tap Arbitration
//=========================================================================
//
// A qualifying tap opens a window. Further taps during the window bump
// the count and close it early. When the window closes, exactly one of
// two outcomes runs against the object of the opening tap:
//
//   count == 2 and second tap on the same object  ─> double_tap
//   anything else                                 ─> tap
//
// Arbitration is global to the recognizer, not per touch identifier.
// `flush()` closes an open window at once and waits for its outcome, so
// nothing is left in flight when the dispatch loop stops.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, Receiver, Sender};
use log::{debug, error, trace, warn};

//=== Internal Dependencies ===============================================

use super::{PointEvent, TapCallback};
use crate::core::scene::{same_object, Capabilities, ObjectRef, WeakObjectRef};

//=== PendingDoubleTap ====================================================

struct PendingDoubleTap {
    tap_count: u32,
    last_tapped: WeakObjectRef,
    cancel: Sender<()>,
}

//=== DoubleTapArbiter ====================================================

pub(crate) struct DoubleTapArbiter {
    window: Duration,
    pending: Arc<Mutex<Option<PendingDoubleTap>>>,
    deadline: Mutex<Option<JoinHandle<()>>>,
}

impl DoubleTapArbiter {
    pub(crate) fn new(window: Duration) -> Self {
        Self {
            window,
            pending: Arc::new(Mutex::new(None)),
            deadline: Mutex::new(None),
        }
    }

    /// Registers a tap on a double-tappable object.
    ///
    /// Opens a window if none is pending; otherwise counts the tap and
    /// closes the pending window early.
    pub(crate) fn register(
        &self,
        object: ObjectRef,
        event: PointEvent,
        tap: TapCallback,
        double_tap: TapCallback,
    ) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(state) = pending.as_mut() {
            state.tap_count += 1;
            state.last_tapped = Arc::downgrade(&object);
            // A full slot means the window is already closing.
            let _ = state.cancel.try_send(());
            trace!(target: "gesture", "Double-tap window closed by tap #{}", state.tap_count);
            return;
        }

        let (cancel_tx, cancel_rx) = bounded(1);
        *pending = Some(PendingDoubleTap {
            tap_count: 1,
            last_tapped: Arc::downgrade(&object),
            cancel: cancel_tx,
        });
        drop(pending);

        let shared = Arc::clone(&self.pending);
        let window = self.window;
        let spawned = thread::Builder::new()
            .name("aetheric-double-tap".into())
            .spawn(move || {
                await_second_tap(shared, cancel_rx, window, object, event, tap, double_tap)
            });

        match spawned {
            Ok(handle) => {
                // The previous deadline thread has already taken its state.
                let previous = self.deadline_slot().replace(handle);
                join_deadline(previous);
            }
            Err(err) => {
                warn!(target: "gesture", "Failed to spawn double-tap wait: {err}");
                self.pending
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .take();
            }
        }
    }

    /// Resolves an open window immediately and waits until its outcome
    /// has been delivered.
    ///
    /// A window closed this way counts as expired: a single pending tap
    /// resolves as a tap.
    pub(crate) fn flush(&self) {
        if let Some(state) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            debug!(target: "gesture", "Flushing open double-tap window");
            let _ = state.cancel.try_send(());
        }

        let handle = self.deadline_slot().take();
        join_deadline(handle);
    }

    fn deadline_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.deadline.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[cfg(test)]
    pub(crate) fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

//=== Deadline Task =======================================================

fn join_deadline(handle: Option<JoinHandle<()>>) {
    if let Some(handle) = handle {
        if handle.join().is_err() {
            error!(target: "gesture", "Double-tap deadline thread panicked");
        }
    }
}

fn await_second_tap(
    shared: Arc<Mutex<Option<PendingDoubleTap>>>,
    cancelled: Receiver<()>,
    window: Duration,
    object: ObjectRef,
    event: PointEvent,
    tap: TapCallback,
    double_tap: TapCallback,
) {
    let Some(state) = resolve(&shared, &cancelled, window) else {
        return;
    };

    let second_on_same = state.tap_count == 2
        && state
            .last_tapped
            .upgrade()
            .map_or(false, |last| same_object(&last, &object));

    let caps = object.capabilities();
    if second_on_same && caps.contains(Capabilities::DOUBLE_TAPPABLE) {
        trace!(target: "gesture", "Double tap");
        double_tap(object, event);
    } else if caps.contains(Capabilities::TAPPABLE) {
        trace!(target: "gesture", "Tap after double-tap window ({} taps)", state.tap_count);
        tap(object, event);
    }
}

/// Waits for cancellation or the deadline, then takes the pending state.
///
/// Taking under the lock makes expiry and cancellation one event: a tap
/// arriving afterwards opens a fresh window.
fn resolve(
    shared: &Mutex<Option<PendingDoubleTap>>,
    cancelled: &Receiver<()>,
    window: Duration,
) -> Option<PendingDoubleTap> {
    let _ = cancelled.recv_timeout(window);
    shared.lock().unwrap_or_else(PoisonError::into_inner).take()
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_support::MockObject;
    use crossbeam_channel::unbounded;
    use std::time::Instant;

    fn recorder() -> (TapCallback, TapCallback, Receiver<&'static str>) {
        let (tx, rx) = unbounded();
        let tap_tx = tx.clone();
        let tap: TapCallback = Arc::new(move |_, _| {
            let _ = tap_tx.send("tap");
        });
        let double: TapCallback = Arc::new(move |_, _| {
            let _ = tx.send("double");
        });
        (tap, double, rx)
    }

    #[test]
    fn lone_tap_resolves_after_window() {
        let arbiter = DoubleTapArbiter::new(Duration::from_millis(50));
        let object = MockObject::new("btn", Capabilities::TAPPABLE | Capabilities::DOUBLE_TAPPABLE);
        let (tap, double, rx) = recorder();

        let started = Instant::now();
        arbiter.register(object, PointEvent::default(), tap, double);
        assert!(arbiter.is_pending());

        assert_eq!(rx.recv_timeout(Duration::from_secs(2)), Ok("tap"));
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        assert!(!arbiter.is_pending());
    }

    #[test]
    fn second_tap_closes_window_early() {
        let arbiter = DoubleTapArbiter::new(Duration::from_secs(5));
        let object = MockObject::new("btn", Capabilities::TAPPABLE | Capabilities::DOUBLE_TAPPABLE);
        let (tap, double, rx) = recorder();

        let started = Instant::now();
        arbiter.register(object.clone(), PointEvent::default(), tap.clone(), double.clone());
        arbiter.register(object, PointEvent::default(), tap, double);

        assert_eq!(rx.recv_timeout(Duration::from_secs(2)), Ok("double"));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
    }

    #[test]
    fn non_tappable_object_gets_nothing_on_single_tap() {
        let arbiter = DoubleTapArbiter::new(Duration::from_millis(20));
        let object = MockObject::new("pad", Capabilities::DOUBLE_TAPPABLE);
        let (tap, double, rx) = recorder();

        arbiter.register(object, PointEvent::default(), tap, double);

        assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
        assert!(!arbiter.is_pending());
    }

    #[test]
    fn flush_resolves_open_window_without_waiting() {
        let arbiter = DoubleTapArbiter::new(Duration::from_secs(5));
        let object = MockObject::new("btn", Capabilities::TAPPABLE | Capabilities::DOUBLE_TAPPABLE);
        let (tap, double, rx) = recorder();

        let started = Instant::now();
        arbiter.register(object, PointEvent::default(), tap, double);
        arbiter.flush();

        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(rx.try_recv(), Ok("tap"));
        assert!(!arbiter.is_pending());
    }

    #[test]
    fn flush_without_open_window_is_a_no_op() {
        let arbiter = DoubleTapArbiter::new(Duration::from_millis(20));
        arbiter.flush();
        arbiter.flush();
        assert!(!arbiter.is_pending());
    }
}
