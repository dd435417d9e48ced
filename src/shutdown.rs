//! Cancellation signaling for the supervision loop.
use std::{
    sync::{Arc, Condvar, Mutex},
    time::{Duration, Instant},
};

/// Cloneable cancellation token observed by the supervision loop.
///
/// Interrupt handlers call [`ShutdownSignal::cancel`] from their own thread;
/// the supervision loop checks the token around every suspension point and
/// sleeps through [`ShutdownSignal::sleep`], so a cancellation wakes it
/// immediately instead of waiting out a full poll interval.
#[derive(Clone, Debug, Default)]
pub struct ShutdownSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl ShutdownSignal {
    /// Creates a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the token cancelled and wakes every pending sleep.
    ///
    /// Cancellation is permanent; calling this more than once is harmless.
    pub fn cancel(&self) {
        let (flag, condvar) = &*self.inner;
        let mut cancelled = flag.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        *cancelled = true;
        condvar.notify_all();
    }

    /// Returns `true` once [`ShutdownSignal::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        let (flag, _) = &*self.inner;
        *flag.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Sleeps for up to `timeout`, waking early on cancellation.
    ///
    /// Returns `true` when the token was cancelled before or during the
    /// wait, `false` when the full timeout elapsed.
    pub fn sleep(&self, timeout: Duration) -> bool {
        let (flag, condvar) = &*self.inner;
        let deadline = Instant::now() + timeout;
        let mut cancelled = flag.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        while !*cancelled {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = condvar
                .wait_timeout(cancelled, deadline - now)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            cancelled = guard;
        }
        true
    }
}
