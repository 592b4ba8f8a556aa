//! Cooperative cancellation of the effect routines.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Condvar, Mutex, PoisonError,
    },
    time::{Duration, Instant},
};

/// A shared flag that a running effect routine polls between rendering steps.
///
/// The flag starts in the "continue" state and can be switched off only once:
/// the scheduler creates a fresh signal for every dispatched routine. Routines
/// that sleep between frames through [`CancellationSignal::sleep`] are woken up
/// as soon as the signal is cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationSignal {
    inner: Arc<SignalInner>,
}

#[derive(Debug)]
struct SignalInner {
    proceed: AtomicBool,
    lock: Mutex<()>,
    wakeup: Condvar,
}

impl Default for SignalInner {
    fn default() -> Self {
        Self {
            proceed: AtomicBool::new(true),
            lock: Mutex::new(()),
            wakeup: Condvar::new(),
        }
    }
}

impl CancellationSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` once the signal has been cancelled.
    ///
    /// Everything the cancelling thread did before [`CancellationSignal::cancel`]
    /// is visible to the caller after it observes `false`.
    pub fn should_continue(&self) -> bool {
        self.inner.proceed.load(Ordering::Acquire)
    }

    /// Tells the routine to stop and wakes it up if it sleeps.
    pub fn cancel(&self) {
        self.inner.proceed.store(false, Ordering::Release);
        // Taking the lock guarantees that a sleeper is either before its flag
        // check or already waiting on the condvar.
        let _guard = self.inner.lock.lock().unwrap_or_else(PoisonError::into_inner);
        self.inner.wakeup.notify_all();
    }

    /// Sleeps for the given duration unless the signal is cancelled earlier.
    ///
    /// Returns `true` if the routine should continue.
    pub fn sleep(&self, duration: Duration) -> bool {
        let deadline = Instant::now() + duration;
        let mut guard = self.inner.lock.lock().unwrap_or_else(PoisonError::into_inner);
        while self.should_continue() {
            let now = Instant::now();
            if now >= deadline {
                return true;
            }
            guard = self
                .inner
                .wakeup
                .wait_timeout(guard, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn test_sleep_without_cancel() {
        let signal = CancellationSignal::new();
        let now = Instant::now();
        assert!(signal.sleep(Duration::from_millis(20)));
        assert!(now.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_cancel_wakes_sleeper() {
        let signal = CancellationSignal::new();
        let sleeper = {
            let signal = signal.clone();
            thread::spawn(move || {
                let now = Instant::now();
                let proceed = signal.sleep(Duration::from_secs(30));
                (proceed, now.elapsed())
            })
        };

        thread::sleep(Duration::from_millis(20));
        signal.cancel();
        let (proceed, elapsed) = sleeper.join().unwrap();
        assert!(!proceed);
        assert!(elapsed < Duration::from_secs(5));
        assert!(!signal.should_continue());
    }

    #[test]
    fn test_cancelled_signal_does_not_sleep() {
        let signal = CancellationSignal::new();
        signal.cancel();
        let now = Instant::now();
        assert!(!signal.sleep(Duration::from_secs(30)));
        assert!(now.elapsed() < Duration::from_secs(1));
    }
}
