//! # Resale Pricing Policy
//!
//! Computes the maximum price a ticket may be relisted at, from the
//! organizer's cap scheme on the event. Pure and deterministic; the
//! marketplace service calls it before accepting or repricing a listing,
//! and callers outside the write path can use it standalone to preview a
//! ceiling.
//!
//! # Examples
//!
//! ```
//! use boxoffice::domain::entities::{Event, Ticket};
//! use boxoffice::domain::services::resale_pricing::max_resale_price;
//! use boxoffice::domain::value_objects::{
//!     Money, ResaleCapType, TierId, Timestamp, UserId,
//! };
//!
//! let event = Event::builder("Encore Night", Timestamp::now().add_days(30))
//!     .resale_cap_type(ResaleCapType::PercentageCap)
//!     .resale_cap_value(110)
//!     .build();
//! let ticket = Ticket::new(
//!     event.id(),
//!     TierId::new_v4(),
//!     UserId::new_v4(),
//!     Money::from_minor(10_000).unwrap(),
//!     Money::from_minor(10_800).unwrap(),
//! );
//!
//! let ceiling = max_resale_price(&ticket, &event);
//! assert!(ceiling.permits(Money::from_minor(11_000).unwrap()));
//! assert!(!ceiling.permits(Money::from_minor(11_001).unwrap()));
//! assert_eq!(ceiling.describe(), "110% of face value");
//! ```

use crate::domain::entities::{Event, Ticket};
use crate::domain::value_objects::{Money, ResaleCapType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Percentage of face value applied when the event sets no cap scheme, or
/// a percentage scheme without a value.
pub const DEFAULT_PERCENTAGE_CAP: u32 = 110;

/// The price ceiling governing one ticket's resale, with enough context to
/// explain a rejection.
///
/// An unbounded ceiling (`NO_CAP`) has no maximum price and permits any
/// amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResaleCeiling {
    /// The event's cap scheme; `None` when the event left it unset and the
    /// platform default applied.
    cap_type: Option<ResaleCapType>,
    /// The governing percentage, for percentage-derived ceilings.
    percent: Option<u32>,
    /// The maximum permitted price; `None` means unbounded.
    max_price: Option<Money>,
}

impl ResaleCeiling {
    const fn bounded(
        cap_type: Option<ResaleCapType>,
        percent: Option<u32>,
        max_price: Money,
    ) -> Self {
        Self {
            cap_type,
            percent,
            max_price: Some(max_price),
        }
    }

    const fn unbounded() -> Self {
        Self {
            cap_type: Some(ResaleCapType::NoCap),
            percent: None,
            max_price: None,
        }
    }

    /// Returns true if `price` does not exceed this ceiling.
    #[inline]
    #[must_use]
    pub fn permits(&self, price: Money) -> bool {
        match self.max_price {
            Some(max) => price <= max,
            None => true,
        }
    }

    /// Returns the event's cap scheme, `None` when the platform default
    /// applied.
    #[inline]
    #[must_use]
    pub fn cap_type(&self) -> Option<ResaleCapType> {
        self.cap_type
    }

    /// Returns the governing percentage for percentage-derived ceilings.
    #[inline]
    #[must_use]
    pub fn percent(&self) -> Option<u32> {
        self.percent
    }

    /// Returns the maximum permitted price, `None` when unbounded.
    #[inline]
    #[must_use]
    pub fn max_price(&self) -> Option<Money> {
        self.max_price
    }

    /// Describes the governing branch for rejection messages, e.g.
    /// `"110% of face value"`.
    #[must_use]
    pub fn describe(&self) -> String {
        match (self.cap_type, self.percent) {
            (Some(ResaleCapType::FaceValueOnly), _) => "face value only".to_string(),
            (Some(ResaleCapType::FaceValuePlusFees), _) => {
                "face value plus original fees".to_string()
            }
            (Some(ResaleCapType::NoCap), _) => "no limit".to_string(),
            (Some(ResaleCapType::Custom), _) => match self.max_price {
                Some(_) => "organizer-set limit".to_string(),
                None => "face value only".to_string(),
            },
            (Some(ResaleCapType::PercentageCap) | None, percent) => {
                let pct = percent.unwrap_or(DEFAULT_PERCENTAGE_CAP);
                format!("{pct}% of face value")
            }
        }
    }
}

impl fmt::Display for ResaleCeiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max_price {
            Some(max) => write!(f, "{} ({})", max, self.describe()),
            None => write!(f, "{}", self.describe()),
        }
    }
}

/// Computes the resale price ceiling for `ticket` under `event`'s policy.
///
/// Branches:
/// - `FACE_VALUE_ONLY`: the ticket's face value.
/// - `FACE_VALUE_PLUS_FEES`: the price the holder originally paid.
/// - `PERCENTAGE_CAP`: `floor(face × percent / 100)`, percent defaulting
///   to [`DEFAULT_PERCENTAGE_CAP`] when the event leaves it unset.
/// - `NO_CAP`: unbounded.
/// - `CUSTOM`: the event's custom cap, falling back to face value when the
///   organizer never set one.
/// - Scheme unset: the default percentage cap.
///
/// Percentage ceilings that would overflow the minor-unit range saturate
/// to [`Money::MAX`].
#[must_use]
pub fn max_resale_price(ticket: &Ticket, event: &Event) -> ResaleCeiling {
    match event.resale_cap_type() {
        Some(ResaleCapType::FaceValueOnly) => ResaleCeiling::bounded(
            Some(ResaleCapType::FaceValueOnly),
            None,
            ticket.face_value(),
        ),
        Some(ResaleCapType::FaceValuePlusFees) => ResaleCeiling::bounded(
            Some(ResaleCapType::FaceValuePlusFees),
            None,
            ticket.price_paid(),
        ),
        Some(ResaleCapType::PercentageCap) => percentage_ceiling(
            ticket,
            Some(ResaleCapType::PercentageCap),
            event.resale_cap_value().unwrap_or(DEFAULT_PERCENTAGE_CAP),
        ),
        Some(ResaleCapType::NoCap) => ResaleCeiling::unbounded(),
        Some(ResaleCapType::Custom) => {
            let max = event.custom_resale_cap().unwrap_or_else(|| ticket.face_value());
            ResaleCeiling::bounded(Some(ResaleCapType::Custom), None, max)
        }
        None => percentage_ceiling(ticket, None, DEFAULT_PERCENTAGE_CAP),
    }
}

fn percentage_ceiling(
    ticket: &Ticket,
    cap_type: Option<ResaleCapType>,
    percent: u32,
) -> ResaleCeiling {
    let max = ticket
        .face_value()
        .percent_floor(percent)
        .unwrap_or(Money::MAX);
    ResaleCeiling::bounded(cap_type, Some(percent), max)
}
