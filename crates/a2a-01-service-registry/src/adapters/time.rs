use crate::ports::TimeSource;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::time::Duration;

// ============================================================================
// SystemTimeSource - Production Time Source
// ============================================================================

/// Production time source using the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl SystemTimeSource {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl TimeSource for SystemTimeSource {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// ============================================================================
// ManualTimeSource - Controllable Time Source
// ============================================================================

/// A clock that only moves when told to.
///
/// ```rust
/// use a2a_01_service_registry::adapters::ManualTimeSource;
/// use a2a_01_service_registry::ports::TimeSource;
/// use std::time::Duration;
///
/// let clock = ManualTimeSource::starting_now();
/// let before = clock.now();
/// clock.advance(Duration::from_secs(61));
/// assert_eq!((clock.now() - before).num_seconds(), 61);
/// ```
#[derive(Debug)]
pub struct ManualTimeSource {
    now: Mutex<DateTime<Utc>>,
}

impl ManualTimeSource {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock();
        *now += chrono::Duration::from_std(by).unwrap_or_else(|_| chrono::Duration::zero());
    }

    pub fn set(&self, at: DateTime<Utc>) {
        *self.now.lock() = at;
    }
}

impl TimeSource for ManualTimeSource {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock()
    }
}
