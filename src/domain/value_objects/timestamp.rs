//! # Timestamp Value Object
//!
//! UTC wall-clock instants with the duration helpers the lifecycle rules
//! need (listing expiry is event start minus 2 hours, transfer expiry is
//! creation plus a configured number of days).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A UTC instant.
///
/// Wraps [`DateTime<Utc>`] so domain code deals in one timestamp type with
/// explicit helpers instead of raw chrono arithmetic at every call site.
///
/// # Examples
///
/// ```
/// use boxoffice::domain::value_objects::timestamp::Timestamp;
///
/// let created = Timestamp::now();
/// let expires = created.add_days(7);
/// assert!(expires.is_after(created));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current wall-clock time.
    ///
    /// Services obtain "now" through the injected clock; this is the raw
    /// source the system clock uses.
    #[must_use]
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a timestamp from a chrono datetime.
    #[inline]
    #[must_use]
    pub const fn from_datetime(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// Returns the inner chrono datetime.
    #[inline]
    #[must_use]
    pub const fn datetime(self) -> DateTime<Utc> {
        self.0
    }

    /// Creates a timestamp from milliseconds since the Unix epoch.
    ///
    /// Returns `None` for values outside chrono's representable range.
    #[must_use]
    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self)
    }

    /// Returns milliseconds since the Unix epoch.
    #[inline]
    #[must_use]
    pub fn timestamp_millis(self) -> i64 {
        self.0.timestamp_millis()
    }

    /// Returns this instant shifted forward by whole seconds.
    #[must_use]
    pub fn add_secs(self, secs: i64) -> Self {
        Self(self.0 + Duration::seconds(secs))
    }

    /// Returns this instant shifted forward by whole days.
    #[must_use]
    pub fn add_days(self, days: i64) -> Self {
        Self(self.0 + Duration::days(days))
    }

    /// Returns this instant shifted backward by whole hours.
    #[must_use]
    pub fn sub_hours(self, hours: i64) -> Self {
        Self(self.0 - Duration::hours(hours))
    }

    /// Returns true if this instant is strictly after `other`.
    #[inline]
    #[must_use]
    pub fn is_after(self, other: Self) -> bool {
        self.0 > other.0
    }

    /// Returns true if this instant is strictly before `other`.
    #[inline]
    #[must_use]
    pub fn is_before(self, other: Self) -> bool {
        self.0 < other.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(timestamp: Timestamp) -> Self {
        timestamp.datetime()
    }
}
