//=========================================================================
// Callback Runner
//=========================================================================
//
// Serializes widget handlers on one thread, in the order they were
// queued, without ever blocking the code that queues them.
//
// Architecture:
//   dispatch loop ──┐
//                   ├──queue()──> EventQueue<Callback> ──> runner thread
//   double-tap wait ┘
//
//=========================================================================

//=== Standard Library Imports ============================================

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

//=== External Dependencies ===============================================

use crossbeam_channel::Sender;
use log::{debug, error};

//=== Internal Dependencies ===============================================

use crate::core::queue::EventQueue;

//=== Types ===============================================================

/// A queued unit of widget work.
pub type Callback = Box<dyn FnOnce() + Send>;

//=== CallbackSender ======================================================

/// Cheap, cloneable producer handle for the callback queue.
#[derive(Clone)]
pub struct CallbackSender {
    sender: Sender<Callback>,
}

impl CallbackSender {
    /// Queues `callback`. Dropped with a debug log after shutdown.
    pub fn queue<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.sender.send(Box::new(callback)).is_err() {
            debug!(target: "driver", "Callback queue closed, dropping callback");
        }
    }
}

//=== CallbackRunner ======================================================

pub(crate) struct CallbackRunner {
    queue: Arc<EventQueue<Callback>>,
    worker: Option<JoinHandle<()>>,
}

impl CallbackRunner {
    pub(crate) fn new(capacity: usize) -> Self {
        let queue = Arc::new(EventQueue::with_capacity(capacity));
        let output = queue.output().clone();

        let worker = thread::Builder::new()
            .name("aetheric-callbacks".into())
            .spawn(move || {
                for callback in output.iter() {
                    if panic::catch_unwind(AssertUnwindSafe(callback)).is_err() {
                        error!(target: "driver", "Callback panicked");
                    }
                }
                debug!(target: "driver", "Callback runner exiting");
            });

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(err) => {
                error!(target: "driver", "Failed to spawn callback runner: {err}");
                None
            }
        };

        Self { queue, worker }
    }

    pub(crate) fn sender(&self) -> CallbackSender {
        CallbackSender {
            sender: self.queue.input().clone(),
        }
    }

    /// Runs everything already queued, then stops the runner.
    pub(crate) fn shutdown(&mut self) {
        self.queue.close();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!(target: "driver", "Callback runner panicked");
            }
        }
    }
}

impl Drop for CallbackRunner {
    fn drop(&mut self) {
        self.shutdown();
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn callbacks_run_in_order_before_shutdown_returns() {
        let mut runner = CallbackRunner::new(4);
        let sender = runner.sender();
        let seen = Arc::new(Mutex::new(Vec::new()));

        for i in 0..50 {
            let seen = Arc::clone(&seen);
            sender.queue(move || seen.lock().unwrap().push(i));
        }
        runner.shutdown();

        assert_eq!(*seen.lock().unwrap(), (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn panicking_callback_does_not_stop_runner() {
        let mut runner = CallbackRunner::new(4);
        let sender = runner.sender();
        let seen = Arc::new(Mutex::new(false));

        sender.queue(|| panic!("handler failure"));
        let flag = Arc::clone(&seen);
        sender.queue(move || *flag.lock().unwrap() = true);
        runner.shutdown();

        assert!(*seen.lock().unwrap());
    }

    #[test]
    fn queue_after_shutdown_is_dropped() {
        let mut runner = CallbackRunner::new(4);
        let sender = runner.sender();
        runner.shutdown();

        sender.queue(|| panic!("must not run"));
    }
}
