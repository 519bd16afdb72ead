use std::thread;
use std::time::{Duration, Instant};

/// Monotonic clock abstraction for the sampler timer and the control loop.
///
/// - now(): returns a monotonic Instant
/// - sleep(): sleeps for the provided duration (implementations may simulate)
/// - sleep_until(): sleeps until a deadline, returning at once if it has passed
/// - park_until(): like sleep_until, but `Thread::unpark` cuts it short
pub trait Clock {
    fn now(&self) -> Instant;
    fn sleep(&self, d: Duration);

    /// Sleep until `deadline`. Returns immediately when the deadline is already behind us.
    fn sleep_until(&self, deadline: Instant) {
        let remaining = deadline.saturating_duration_since(self.now());
        self.sleep(remaining);
    }

    /// Park the current thread until `deadline` or until it is unparked.
    ///
    /// May return early (unpark or spurious wake-up); callers re-check the time.
    fn park_until(&self, deadline: Instant) {
        let remaining = deadline.saturating_duration_since(self.now());
        if !remaining.is_zero() {
            thread::park_timeout(remaining);
        }
    }

    /// Milliseconds elapsed since `epoch`, saturating at 0 on underflow.
    fn ms_since(&self, epoch: Instant) -> u64 {
        let dur = self.now().saturating_duration_since(epoch);
        u64::try_from(dur.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Default, real-time monotonic clock backed by std::time::Instant.
#[derive(Debug, Default, Clone, Copy)]
pub struct MonotonicClock;

impl MonotonicClock {
    #[inline]
    pub fn new() -> Self {
        Self
    }
}

impl Clock for MonotonicClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, d: Duration) {
        if d.is_zero() {
            return;
        }
        thread::sleep(d);
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod test_clock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Deterministic test clock whose time can be advanced manually.
    ///
    /// now() = origin + offset
    /// sleep(d) advances internal time by d without actually sleeping.
    #[derive(Debug, Clone)]
    pub struct TestClock {
        origin: Instant,
        offset: Arc<Mutex<Duration>>,
    }

    impl Default for TestClock {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestClock {
        pub fn new() -> Self {
            Self {
                origin: Instant::now(),
                offset: Arc::new(Mutex::new(Duration::ZERO)),
            }
        }

        /// Advance the clock by the given duration.
        pub fn advance(&self, d: Duration) {
            if let Ok(mut off) = self.offset.lock() {
                *off = off.saturating_add(d);
            }
        }

        /// Total simulated time elapsed since construction.
        pub fn elapsed(&self) -> Duration {
            self.offset.lock().map(|g| *g).unwrap_or(Duration::ZERO)
        }
    }

    impl Clock for TestClock {
        fn now(&self) -> Instant {
            self.origin + self.elapsed()
        }

        fn sleep(&self, d: Duration) {
            self.advance(d);
            // Yield so a consumer thread polling in real time gets scheduled.
            std::thread::yield_now();
        }

        // Virtual time cannot be waited on; jump straight to the deadline.
        fn park_until(&self, deadline: Instant) {
            self.sleep_until(deadline);
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn sleep_until_advances_to_deadline() {
            let clock = TestClock::new();
            let deadline = clock.now() + Duration::from_millis(100);
            clock.sleep_until(deadline);
            assert_eq!(clock.elapsed(), Duration::from_millis(100));
            assert_eq!(clock.ms_since(clock.origin), 100);
        }

        #[test]
        fn sleep_until_past_deadline_is_noop() {
            let clock = TestClock::new();
            let past = clock.now();
            clock.advance(Duration::from_millis(5));
            clock.sleep_until(past);
            assert_eq!(clock.elapsed(), Duration::from_millis(5));
        }

        #[test]
        fn park_until_advances_virtual_time() {
            let clock = TestClock::new();
            let deadline = clock.now() + Duration::from_secs(1);
            clock.park_until(deadline);
            assert_eq!(clock.now(), deadline);
        }
    }
}
