//! # Clock
//!
//! Wall-clock access for the marketplace services.
//!
//! Listing and transfer expiry are judged lazily against "now", so the
//! services read time through the [`Clock`] port. Production wiring uses
//! [`SystemClock`]; tests pin and advance time with [`ManualClock`].

use crate::domain::value_objects::Timestamp;
use std::fmt;
use std::sync::{Arc, RwLock};

/// Source of the current time.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` for use in async contexts.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Returns the current instant.
    fn now(&self) -> Timestamp;
}

/// Clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Clock that only moves when told to.
///
/// # Examples
///
/// ```
/// use boxoffice::application::services::clock::{Clock, ManualClock};
/// use boxoffice::domain::value_objects::Timestamp;
///
/// let clock = ManualClock::starting_at(Timestamp::now());
/// let before = clock.now();
/// clock.advance_days(8);
/// assert!(clock.now().is_after(before.add_days(7)));
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    /// Current instant.
    now: Arc<RwLock<Timestamp>>,
}

impl ManualClock {
    /// Creates a clock pinned at the given instant.
    #[must_use]
    pub fn starting_at(now: Timestamp) -> Self {
        Self {
            now: Arc::new(RwLock::new(now)),
        }
    }

    /// Moves the clock to the given instant.
    pub fn set(&self, now: Timestamp) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard = now;
    }

    /// Moves the clock forward by whole seconds.
    pub fn advance_secs(&self, secs: i64) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard = guard.add_secs(secs);
    }

    /// Moves the clock forward by whole days.
    pub fn advance_days(&self, days: i64) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard = guard.add_days(days);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}
