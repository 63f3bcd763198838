//! Binary handoff semaphore between adjacent pipeline stages.
//!
//! Uses an `embassy-sync` [`Signal`] as a count that saturates at one:
//! any number of `signal()` calls before the consumer wakes collapse into
//! a single release, and the consumer sees the producer's latest buffer
//! write rather than every intermediate one.
//!
//! ```text
//!  producer ──write buffer──▶ signal() ──┐
//!                                        ▼
//!  consumer ◀──read buffer── wait() ◀── [0|1]
//! ```

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

/// One-shot release from a producer stage to exactly one consumer stage.
pub struct HandoffSemaphore {
    signal: Signal<CriticalSectionRawMutex, ()>,
}

impl HandoffSemaphore {
    /// Count starts at zero.
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    /// Set the count to one.  Never blocks; a no-op when already pending.
    pub fn signal(&self) {
        self.signal.signal(());
    }

    /// Suspend until the count is one, then reset it to zero.
    ///
    /// Only the consumer stage may wait; the underlying signal keeps a
    /// single waker slot.
    pub async fn wait(&self) {
        self.signal.wait().await;
    }

    /// Blocking form of [`wait`](Self::wait) for plain threads.
    pub fn wait_blocking(&self) {
        futures_lite::future::block_on(self.wait());
    }

    /// Take a pending release without suspending.
    pub fn try_take(&self) -> bool {
        self.signal.try_take().is_some()
    }

    /// Whether a release is pending.
    pub fn is_pending(&self) -> bool {
        self.signal.signaled()
    }

    /// Current count (0 or 1).
    pub fn count(&self) -> u8 {
        u8::from(self.is_pending())
    }
}

impl Default for HandoffSemaphore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn starts_at_zero() {
        let sem = HandoffSemaphore::new();
        assert_eq!(sem.count(), 0);
        assert!(!sem.try_take());
    }

    #[test]
    fn repeated_signals_saturate_at_one() {
        let sem = HandoffSemaphore::new();
        for _ in 0..7 {
            sem.signal();
        }
        assert_eq!(sem.count(), 1);
        sem.wait_blocking();
        assert_eq!(sem.count(), 0);
        assert!(!sem.try_take(), "one wait drains every collapsed signal");
    }

    #[test]
    fn wait_returns_immediately_when_pending() {
        let sem = HandoffSemaphore::new();
        sem.signal();
        sem.wait_blocking();
        assert!(!sem.is_pending());
    }

    #[test]
    fn waiter_wakes_on_signal_from_another_thread() {
        let sem = Arc::new(HandoffSemaphore::new());
        let producer = {
            let sem = sem.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(20));
                sem.signal();
            })
        };
        sem.wait_blocking();
        assert_eq!(sem.count(), 0);
        producer.join().unwrap();
    }
}
