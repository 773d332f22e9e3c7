// Time Provider Port (for testability)

/// Time provider interface (allows mocking in tests)
pub trait TimeProvider: Send + Sync {
    /// Get current time in milliseconds since epoch
    fn now_millis(&self) -> i64;
}

/// System time provider (production)
pub struct SystemTimeProvider;

impl TimeProvider for SystemTimeProvider {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Clock that advances by a fixed step on every read
    pub struct SteppingTimeProvider {
        next: AtomicI64,
        step_ms: i64,
    }

    impl SteppingTimeProvider {
        pub fn new(start_ms: i64, step_ms: i64) -> Self {
            Self {
                next: AtomicI64::new(start_ms),
                step_ms,
            }
        }
    }

    impl TimeProvider for SteppingTimeProvider {
        fn now_millis(&self) -> i64 {
            self.next.fetch_add(self.step_ms, Ordering::SeqCst)
        }
    }
}
