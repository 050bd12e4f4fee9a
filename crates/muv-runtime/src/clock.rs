//! Time sources for the render scheduler.
//!
//! Production code reads the wall clock; tests drive a [`LabClock`] whose
//! offset advances only when told to, so throttling behavior is exact and
//! repeatable.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use web_time::Instant;

/// Manually advanced clock for deterministic scheduling tests.
///
/// Cheap to clone; clones share the same offset.
#[derive(Clone, Debug)]
pub struct LabClock {
    epoch: Instant,
    offset_us: Arc<AtomicU64>,
}

impl Default for LabClock {
    fn default() -> Self {
        Self::new()
    }
}

impl LabClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            offset_us: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Move the clock forward. Time never rewinds.
    pub fn advance(&self, by: Duration) {
        let us = u64::try_from(by.as_micros()).unwrap_or(u64::MAX);
        self.offset_us.fetch_add(us, Ordering::SeqCst);
    }

    #[must_use]
    pub fn now(&self) -> Instant {
        self.epoch + Duration::from_micros(self.offset_us.load(Ordering::SeqCst))
    }
}

/// Where the scheduler reads "now" from.
#[derive(Clone, Debug)]
pub enum TimeSource {
    /// The real monotonic clock.
    Real,
    /// A [`LabClock`] under test control.
    Lab(LabClock),
}

impl TimeSource {
    #[must_use]
    pub fn now(&self) -> Instant {
        match self {
            Self::Real => Instant::now(),
            Self::Lab(clock) => clock.now(),
        }
    }
}
