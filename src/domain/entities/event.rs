//! # Event Reference Data
//!
//! The event an admission right belongs to, carried here for the parts the
//! marketplace reads: schedule, lifecycle status, and the organizer's
//! resale policy. Organizer-side event management lives outside this core;
//! events arrive as reference data.
//!
//! # Examples
//!
//! ```
//! use boxoffice::domain::entities::event::Event;
//! use boxoffice::domain::value_objects::{Money, ResaleCapType, Timestamp};
//!
//! let event = Event::builder("Glasto Revival", Timestamp::now().add_days(90))
//!     .resale_cap_type(ResaleCapType::PercentageCap)
//!     .resale_cap_value(120)
//!     .build();
//!
//! assert!(event.allows_resale());
//! ```

use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{EventId, EventStatus, Money, ResaleCapType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An event with the schedule and resale policy the marketplace enforces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier for this event.
    id: EventId,
    /// Human-readable event name.
    name: String,
    /// Organizer-side lifecycle status.
    status: EventStatus,
    /// When the event starts.
    start_time: Timestamp,
    /// Whether the organizer permits resale at all.
    allow_resale: bool,
    /// Resale price cap scheme, if the organizer chose one.
    resale_cap_type: Option<ResaleCapType>,
    /// Percentage for `PercentageCap`, in whole percent of face value.
    resale_cap_value: Option<u32>,
    /// Absolute ceiling for `Custom`, in minor units.
    custom_resale_cap: Option<Money>,
}

impl Event {
    /// Creates a published event with resale allowed and no cap scheme set,
    /// which leaves the platform default percentage cap in force.
    #[must_use]
    pub fn new(name: impl Into<String>, start_time: Timestamp) -> Self {
        Self::builder(name, start_time).build()
    }

    /// Starts building an event, for when policy fields need setting.
    #[must_use]
    pub fn builder(name: impl Into<String>, start_time: Timestamp) -> EventBuilder {
        EventBuilder::new(name.into(), start_time)
    }

    /// Reconstructs an event from storage.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: EventId,
        name: String,
        status: EventStatus,
        start_time: Timestamp,
        allow_resale: bool,
        resale_cap_type: Option<ResaleCapType>,
        resale_cap_value: Option<u32>,
        custom_resale_cap: Option<Money>,
    ) -> Self {
        Self {
            id,
            name,
            status,
            start_time,
            allow_resale,
            resale_cap_type,
            resale_cap_value,
            custom_resale_cap,
        }
    }

    // ========== Accessors ==========

    /// Returns the event ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> EventId {
        self.id
    }

    /// Returns the event name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the lifecycle status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> EventStatus {
        self.status
    }

    /// Returns when the event starts.
    #[inline]
    #[must_use]
    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    /// Returns whether the organizer permits resale.
    #[inline]
    #[must_use]
    pub fn allows_resale(&self) -> bool {
        self.allow_resale
    }

    /// Returns the cap scheme, if one was chosen.
    #[inline]
    #[must_use]
    pub fn resale_cap_type(&self) -> Option<ResaleCapType> {
        self.resale_cap_type
    }

    /// Returns the percentage for a `PercentageCap` scheme.
    #[inline]
    #[must_use]
    pub fn resale_cap_value(&self) -> Option<u32> {
        self.resale_cap_value
    }

    /// Returns the absolute ceiling for a `Custom` scheme.
    #[inline]
    #[must_use]
    pub fn custom_resale_cap(&self) -> Option<Money> {
        self.custom_resale_cap
    }

    // ========== State Helpers ==========

    /// Returns true if the event start time has passed.
    #[inline]
    #[must_use]
    pub fn has_started(&self, now: Timestamp) -> bool {
        !now.is_before(self.start_time)
    }

    /// Returns true if the organizer cancelled the event.
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.status == EventStatus::Cancelled
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, starts {})", self.name, self.status, self.start_time)
    }
}

/// Builder for constructing [`Event`] instances.
///
/// Provides a fluent API for setting policy fields. Status defaults to
/// `Published`, resale to allowed, and all cap fields to unset.
#[derive(Debug, Clone)]
pub struct EventBuilder {
    name: String,
    status: EventStatus,
    start_time: Timestamp,
    allow_resale: bool,
    resale_cap_type: Option<ResaleCapType>,
    resale_cap_value: Option<u32>,
    custom_resale_cap: Option<Money>,
}

impl EventBuilder {
    /// Creates a new builder with required fields.
    fn new(name: String, start_time: Timestamp) -> Self {
        Self {
            name,
            status: EventStatus::Published,
            start_time,
            allow_resale: true,
            resale_cap_type: None,
            resale_cap_value: None,
            custom_resale_cap: None,
        }
    }

    /// Sets the lifecycle status.
    #[must_use]
    pub fn status(mut self, status: EventStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets whether resale is permitted.
    #[must_use]
    pub fn allow_resale(mut self, allow: bool) -> Self {
        self.allow_resale = allow;
        self
    }

    /// Sets the cap scheme.
    #[must_use]
    pub fn resale_cap_type(mut self, cap_type: ResaleCapType) -> Self {
        self.resale_cap_type = Some(cap_type);
        self
    }

    /// Sets the percentage for a `PercentageCap` scheme.
    #[must_use]
    pub fn resale_cap_value(mut self, percent: u32) -> Self {
        self.resale_cap_value = Some(percent);
        self
    }

    /// Sets the absolute ceiling for a `Custom` scheme.
    #[must_use]
    pub fn custom_resale_cap(mut self, cap: Money) -> Self {
        self.custom_resale_cap = Some(cap);
        self
    }

    /// Builds the event with a fresh ID.
    #[must_use]
    pub fn build(self) -> Event {
        Event {
            id: EventId::new_v4(),
            name: self.name,
            status: self.status,
            start_time: self.start_time,
            allow_resale: self.allow_resale,
            resale_cap_type: self.resale_cap_type,
            resale_cap_value: self.resale_cap_value,
            custom_resale_cap: self.custom_resale_cap,
        }
    }
}
