//! Termination watchdog.
//!
//! `Solver::set_terminate` installs a callback that is polled roughly every 100ms from a
//! dedicated thread, rather than from inside the solving loop: the core is single-threaded and
//! cooperative, only checking a stop flag at conflict checkpoints (see
//! [`SolverState::stop_requested`](crate::state::SolverState::stop_requested)), so a user callback
//! that blocks or runs long cannot stall the search. The watchdog itself is spawned lazily, the
//! first time `set_terminate` is called, and torn down when the `Solver` (and thus the
//! [`Watchdog`]) is dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A user-supplied callback, invoked from the watchdog thread, returning whether to stop.
pub type TerminateCallback = Box<dyn FnMut() -> bool + Send>;

/// Shared state between the `Solver` and its watchdog thread.
struct Shared {
    callback: Mutex<Option<TerminateCallback>>,
    stop: AtomicBool,
    shutdown: AtomicBool,
}

/// Owns the watchdog thread and the flag it sets.
pub struct Watchdog {
    shared: Arc<Shared>,
    thread: Option<JoinHandle<()>>,
}

impl Watchdog {
    /// Spawn a watchdog thread polling `callback` every ~100ms.
    pub fn spawn(callback: TerminateCallback) -> Watchdog {
        let shared = Arc::new(Shared {
            callback: Mutex::new(Some(callback)),
            stop: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
        });

        let thread_shared = shared.clone();
        let thread = std::thread::spawn(move || loop {
            if thread_shared.shutdown.load(Ordering::Acquire) {
                return;
            }

            let stop = {
                let mut callback = thread_shared.callback.lock().unwrap();
                callback.as_mut().map(|callback| callback()).unwrap_or(false)
            };

            if stop {
                thread_shared.stop.store(true, Ordering::Release);
                return;
            }

            std::thread::sleep(POLL_INTERVAL);
        });

        Watchdog {
            shared,
            thread: Some(thread),
        }
    }

    /// Whether the callback has requested termination.
    pub fn stop_requested(&self) -> bool {
        self.shared.stop.load(Ordering::Acquire)
    }
}

impl Drop for Watchdog {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn stop_flag_set_once_callback_returns_true() {
        let calls = Arc::new(AtomicUsize::new(0));
        let watchdog_calls = calls.clone();

        let watchdog = Watchdog::spawn(Box::new(move || {
            watchdog_calls.fetch_add(1, Ordering::SeqCst);
            true
        }));

        for _ in 0..100 {
            if watchdog.stop_requested() {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        assert!(watchdog.stop_requested());
        assert!(calls.load(Ordering::SeqCst) >= 1);
    }
}
