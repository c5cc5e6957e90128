//! # Property-Based Tests for the Resale Pricing Policy
//!
//! This module contains property-based tests using proptest for the cap
//! policy, focusing on determinism and ordering behavior across all
//! branches.
//!
//! # Test Categories
//!
//! - **Determinism**: The same ticket/event pair always yields the same
//!   ceiling
//! - **Monotonicity**: Lowering a permitted price never makes it forbidden
//! - **Floor Bounds**: Percentage ceilings sit exactly at the arithmetic
//!   floor

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use proptest::prelude::*;

use crate::domain::entities::{Event, Ticket};
use crate::domain::services::resale_pricing::{DEFAULT_PERCENTAGE_CAP, max_resale_price};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{Money, ResaleCapType, TierId, UserId};

// ============================================================================
// Strategy Definitions
// ============================================================================

/// Strategy for face values and asking prices in minor units.
fn valid_minor_units() -> impl Strategy<Value = i64> {
    0i64..1_000_000_000i64
}

/// Strategy for cap percentages, including sub-face and generous values.
fn valid_percent() -> impl Strategy<Value = u32> {
    0u32..1_000u32
}

/// Strategy over every cap scheme, `None` meaning the event left it unset.
fn any_cap_scheme() -> impl Strategy<Value = Option<ResaleCapType>> {
    prop_oneof![
        Just(None),
        Just(Some(ResaleCapType::FaceValueOnly)),
        Just(Some(ResaleCapType::FaceValuePlusFees)),
        Just(Some(ResaleCapType::PercentageCap)),
        Just(Some(ResaleCapType::NoCap)),
        Just(Some(ResaleCapType::Custom)),
    ]
}

// ============================================================================
// Test Helpers
// ============================================================================

fn fixture(scheme: Option<ResaleCapType>, face: i64, percent: u32) -> (Ticket, Event) {
    let mut builder = Event::builder("Property Night", Timestamp::now().add_days(30))
        .resale_cap_value(percent)
        .custom_resale_cap(Money::from_minor(face / 2).unwrap());
    if let Some(cap_type) = scheme {
        builder = builder.resale_cap_type(cap_type);
    }
    let event = builder.build();
    let paid = face.saturating_add(face / 10);
    let ticket = Ticket::new(
        event.id(),
        TierId::new_v4(),
        UserId::new_v4(),
        Money::from_minor(face).unwrap(),
        Money::from_minor(paid).unwrap(),
    );
    (ticket, event)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// The policy is a pure function: two evaluations agree exactly.
    #[test]
    fn ceiling_is_deterministic(
        scheme in any_cap_scheme(),
        face in valid_minor_units(),
        percent in valid_percent()
    ) {
        let (ticket, event) = fixture(scheme, face, percent);
        prop_assert_eq!(
            max_resale_price(&ticket, &event),
            max_resale_price(&ticket, &event)
        );
    }

    /// If a price is permitted, every lower price is permitted too.
    #[test]
    fn permits_is_monotone(
        scheme in any_cap_scheme(),
        face in valid_minor_units(),
        percent in valid_percent(),
        high in valid_minor_units(),
        low in valid_minor_units()
    ) {
        let (ticket, event) = fixture(scheme, face, percent);
        let ceiling = max_resale_price(&ticket, &event);

        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let high = Money::from_minor(high).unwrap();
        let low = Money::from_minor(low).unwrap();

        if ceiling.permits(high) {
            prop_assert!(ceiling.permits(low));
        }
    }

    /// Percentage ceilings are the exact arithmetic floor of face × pct%.
    #[test]
    fn percentage_ceiling_is_exact_floor(
        face in valid_minor_units(),
        percent in valid_percent()
    ) {
        let (ticket, event) = fixture(Some(ResaleCapType::PercentageCap), face, percent);
        let ceiling = max_resale_price(&ticket, &event);

        let max = ceiling.max_price().unwrap().minor_units();
        let exact = i128::from(face) * i128::from(percent);
        prop_assert!(i128::from(max) * 100 <= exact);
        prop_assert!(exact < (i128::from(max) + 1) * 100);
    }

    /// An unbounded scheme never produces a violation.
    #[test]
    fn no_cap_never_rejects(face in valid_minor_units(), price in valid_minor_units()) {
        let (ticket, event) = fixture(Some(ResaleCapType::NoCap), face, 0);
        let ceiling = max_resale_price(&ticket, &event);
        prop_assert!(ceiling.permits(Money::from_minor(price).unwrap()));
    }

    /// An unset scheme behaves exactly like the default percentage cap.
    #[test]
    fn unset_scheme_matches_default_percentage(face in valid_minor_units()) {
        let (ticket, unset) = fixture(None, face, DEFAULT_PERCENTAGE_CAP);
        let (_, explicit) = fixture(
            Some(ResaleCapType::PercentageCap),
            face,
            DEFAULT_PERCENTAGE_CAP,
        );

        let from_unset = max_resale_price(&ticket, &unset);
        let from_explicit = max_resale_price(&ticket, &explicit);
        prop_assert_eq!(from_unset.max_price(), from_explicit.max_price());
    }
}
