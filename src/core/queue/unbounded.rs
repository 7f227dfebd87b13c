//=========================================================================
// Unbounded Event Queue
//=========================================================================
//
// FIFO queue whose producers never wait on the consumer.
//
// Architecture:
//   producers ──send()──> intake (bounded) ──┐
//                                            │  worker thread
//                              VecDeque<T> <─┘  (sole owner)
//                                  │
//   consumer <──recv()── output (bounded) <──┘
//
// The worker moves every item off the small intake buffer as soon as it
// lands and only feeds the small output buffer while the consumer keeps
// up. Logical capacity is unbounded: if the consumer stalls forever the
// pending deque grows without limit. That is accepted for event delivery
// queues whose consumer runs for the life of the process.
//
// Shutdown: `close()` signals the worker, which drains whatever is still
// in the intake, flushes everything to the output in order and then
// disconnects the output. A consumer sees `RecvError` only after the last
// flushed item.
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

//=== External Dependencies ===============================================

use crossbeam_channel::{bounded, Receiver, Select, SendError, Sender, TryRecvError};
use log::{debug, trace};

//=== Constants ===========================================================

/// Default size of the intake and output buffers.
///
/// Sixteen small items fit comfortably in a couple of cache lines, which
/// keeps the per-item hand-off cheap.
pub const DEFAULT_BUFFER_CAPACITY: usize = 16;

const MISUSE_MESSAGE: &str =
    "queue: misuse of unbounded event queue, intake was disconnected without close()";

//=== EventQueue ==========================================================

/// Unbounded, order-preserving queue with a non-blocking intake.
///
/// Producers clone the [`Sender`] returned by [`EventQueue::input`] and may
/// call `send` from any thread; the call only ever waits for the internal
/// worker to move an item, never for the consumer. The consumer reads from
/// [`EventQueue::output`].
///
/// # Examples
///
/// ```
/// use aetheric_runtime::core::queue::EventQueue;
///
/// let queue = EventQueue::new();
/// for i in 0..3 {
///     queue.input().send(i).unwrap();
/// }
/// queue.close();
///
/// let received: Vec<i32> = queue.output().iter().collect();
/// assert_eq!(received, vec![0, 1, 2]);
/// ```
pub struct EventQueue<T: Send + 'static> {
    intake: Sender<T>,
    output: Receiver<T>,
    close_signal: Sender<()>,
    closed: AtomicBool,
}

impl<T: Send + 'static> EventQueue<T> {
    //--- Construction -----------------------------------------------------

    /// Creates a queue with [`DEFAULT_BUFFER_CAPACITY`]-sized buffers.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BUFFER_CAPACITY)
    }

    /// Creates a queue whose intake and output buffers hold `capacity`
    /// items each. The queue itself stays unbounded.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "Queue buffer capacity must be positive");

        let (intake, intake_rx) = bounded(capacity);
        let (output_tx, output) = bounded(capacity);
        let (close_signal, close_rx) = bounded(1);

        thread::Builder::new()
            .name("aetheric-queue".into())
            .spawn(move || run_worker(intake_rx, output_tx, close_rx))
            .expect("failed to spawn event queue worker");

        trace!(target: "queue", "Event queue created (buffer capacity: {})", capacity);

        Self {
            intake,
            output,
            close_signal,
            closed: AtomicBool::new(false),
        }
    }

    //--- Channel Ends -----------------------------------------------------

    /// Producer side. Clone it to hand to other threads.
    ///
    /// Sending fails with `SendError` once the queue has been closed and
    /// the worker has drained the intake.
    pub fn input(&self) -> &Sender<T> {
        &self.intake
    }

    /// Consumer side. Yields items strictly in enqueue order and
    /// disconnects after [`EventQueue::close`] has flushed everything.
    pub fn output(&self) -> &Receiver<T> {
        &self.output
    }

    /// Enqueues `item`, dropping it with a debug log if the queue is
    /// already closed.
    pub fn push(&self, item: T) {
        if self.intake.send(item).is_err() {
            debug!(target: "queue", "Dropping item pushed after close");
        }
    }

    //--- Shutdown ---------------------------------------------------------

    /// Disables the intake, flushes queued items to the output and then
    /// closes the output. Calling it more than once is a no-op.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        // Capacity 1 and a single sender: this never blocks.
        let _ = self.close_signal.send(());
        debug!(target: "queue", "Event queue close requested");
    }

    /// Returns true once [`EventQueue::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

impl<T: Send + 'static> Default for EventQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + 'static> Drop for EventQueue<T> {
    fn drop(&mut self) {
        self.close();
    }
}

//=== Worker ==============================================================

/// Moves items from `intake` to `output` until a close signal arrives.
///
/// Owns the pending deque exclusively. Panics if the intake disconnects
/// while no close signal is pending: every sender being dropped without
/// `close()` means items could have been silently lost.
pub(crate) fn run_worker<T: Send>(intake: Receiver<T>, output: Sender<T>, close: Receiver<()>) {
    let mut pending: VecDeque<T> = VecDeque::new();

    loop {
        let mut sel = Select::new();
        let recv_intake = sel.recv(&intake);
        let recv_close = sel.recv(&close);
        let send_output = if pending.is_empty() {
            None
        } else {
            Some(sel.send(&output))
        };

        let oper = sel.select();
        let index = oper.index();

        if index == recv_intake {
            match oper.recv(&intake) {
                Ok(item) => pending.push_back(item),
                Err(_) => {
                    if close.try_recv().is_ok() {
                        break;
                    }
                    panic!("{}", MISUSE_MESSAGE);
                }
            }
        } else if index == recv_close {
            let _ = oper.recv(&close);
            break;
        } else if Some(index) == send_output {
            if let Some(item) = pending.pop_front() {
                if let Err(SendError(item)) = oper.send(&output, item) {
                    // Consumer gone; nobody can observe the rest.
                    pending.push_front(item);
                    debug!(
                        target: "queue",
                        "Consumer disconnected, discarding {} pending items",
                        pending.len()
                    );
                    return;
                }
            }
        }
    }

    shutdown(intake, output, pending);
}

/// Drains the intake, flushes everything in order and disconnects the
/// output by dropping it.
fn shutdown<T: Send>(intake: Receiver<T>, output: Sender<T>, mut pending: VecDeque<T>) {
    loop {
        match intake.try_recv() {
            Ok(item) => pending.push_back(item),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
        }
    }
    drop(intake);

    let flushed = pending.len();
    for item in pending {
        if output.send(item).is_err() {
            debug!(target: "queue", "Consumer disconnected during flush");
            return;
        }
    }

    debug!(target: "queue", "Event queue closed after flushing {} items", flushed);
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn preserves_fifo_order() {
        let queue = EventQueue::new();
        for i in 0..500 {
            queue.input().send(i).unwrap();
        }
        queue.close();

        let received: Vec<i32> = queue.output().iter().collect();
        assert_eq!(received, (0..500).collect::<Vec<_>>());
    }

    #[test]
    fn fifo_with_slow_consumer_and_concurrent_producer() {
        let queue = EventQueue::with_capacity(4);
        let producer = queue.input().clone();

        let handle = thread::spawn(move || {
            for i in 0..200u32 {
                producer.send(i).unwrap();
            }
        });

        let mut received = Vec::new();
        while received.len() < 200 {
            let item = queue
                .output()
                .recv_timeout(Duration::from_secs(2))
                .expect("item not delivered");
            if item % 50 == 0 {
                thread::sleep(Duration::from_millis(5));
            }
            received.push(item);
        }

        handle.join().unwrap();
        assert_eq!(received, (0..200).collect::<Vec<_>>());
    }

    #[test]
    fn producer_never_waits_for_consumer() {
        let queue = EventQueue::new();
        let producer = queue.input().clone();
        let (done_tx, done_rx) = bounded(1);

        // Nothing reads the output while the producer runs.
        thread::spawn(move || {
            for i in 0..5_000u32 {
                producer.send(i).unwrap();
            }
            done_tx.send(()).unwrap();
        });

        done_rx
            .recv_timeout(Duration::from_secs(5))
            .expect("producer was blocked by an idle consumer");

        assert_eq!(queue.output().recv().unwrap(), 0);
    }

    #[test]
    fn close_flushes_then_disconnects() {
        let queue = EventQueue::new();
        queue.push("a");
        queue.push("b");
        queue.close();

        assert_eq!(queue.output().recv().unwrap(), "a");
        assert_eq!(queue.output().recv().unwrap(), "b");
        assert!(queue.output().recv_timeout(Duration::from_secs(2)).is_err());
        assert!(queue.is_closed());
    }

    #[test]
    fn close_is_idempotent() {
        let queue: EventQueue<u8> = EventQueue::new();
        queue.close();
        queue.close();

        assert!(queue.output().recv_timeout(Duration::from_secs(2)).is_err());
    }

    #[test]
    fn push_after_close_is_dropped() {
        let queue = EventQueue::new();
        queue.close();
        assert!(queue.output().recv_timeout(Duration::from_secs(2)).is_err());

        // Intake has been drained and released by now.
        queue.push(7);
        assert!(queue.output().try_recv().is_err());
    }

    #[test]
    #[should_panic(expected = "Queue buffer capacity must be positive")]
    fn zero_capacity_panics() {
        let _queue: EventQueue<u8> = EventQueue::with_capacity(0);
    }

    #[test]
    fn worker_panics_when_intake_disconnects_without_close() {
        let (intake_tx, intake_rx) = bounded::<u8>(4);
        let (output_tx, _output_rx) = bounded(4);
        let (_close_tx, close_rx) = bounded(1);

        let worker = thread::spawn(move || run_worker(intake_rx, output_tx, close_rx));
        drop(intake_tx);

        let err = worker.join().expect_err("worker should panic on misuse");
        let message = err
            .downcast_ref::<String>()
            .cloned()
            .unwrap_or_default();
        assert!(message.contains("misuse of unbounded event queue"));
    }

    #[test]
    fn worker_treats_pending_close_as_shutdown_on_disconnect() {
        let (intake_tx, intake_rx) = bounded::<u8>(4);
        let (output_tx, output_rx) = bounded(4);
        let (close_tx, close_rx) = bounded(1);

        intake_tx.send(1).unwrap();
        close_tx.send(()).unwrap();
        drop(intake_tx);

        let worker = thread::spawn(move || run_worker(intake_rx, output_tx, close_rx));
        worker.join().expect("close followed by disconnect is not misuse");

        assert_eq!(output_rx.iter().collect::<Vec<_>>(), vec![1]);
    }
}
