//! # Ticket Aggregate
//!
//! One admission right tied to an event and a tier.
//!
//! The ticket is the shared resource contended between the resale
//! marketplace and the transfer flow: listing and transferring both
//! encumber it by moving its status off `Valid`, and every resolution path
//! returns it to `Valid`, possibly under a new owner.
//!
//! # Examples
//!
//! ```
//! use boxoffice::domain::entities::ticket::Ticket;
//! use boxoffice::domain::value_objects::{EventId, Money, TierId, Timestamp, UserId};
//!
//! let owner = UserId::new_v4();
//! let mut ticket = Ticket::new(
//!     EventId::new_v4(),
//!     TierId::new_v4(),
//!     owner,
//!     Money::from_minor(10_000).unwrap(),
//!     Money::from_minor(10_800).unwrap(),
//! );
//!
//! assert!(ticket.is_sellable());
//! ticket.mark_listed(Timestamp::now()).unwrap();
//! assert!(!ticket.is_sellable());
//! ```

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value_objects::timestamp::Timestamp;
use crate::domain::value_objects::{EventId, Money, TicketId, TicketStatus, TierId, UserId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// An admission right held by a user.
///
/// # Invariants
///
/// - Status transitions follow [`TicketStatus`] rules
/// - Ownership changes only while resolving an encumbrance (settlement or
///   transfer acceptance)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Unique identifier for this ticket.
    id: TicketId,
    /// The event this ticket admits to.
    event_id: EventId,
    /// The tier the ticket was sold under.
    tier_id: TierId,
    /// The user currently holding the admission right.
    current_owner_id: UserId,
    /// Current lifecycle status.
    status: TicketStatus,
    /// Original price set by the organizer, minor units.
    face_value: Money,
    /// Amount the current holder originally paid (face value plus fees).
    price_paid: Money,
    /// When this ticket was created.
    created_at: Timestamp,
    /// When this ticket was last updated.
    updated_at: Timestamp,
}

impl Ticket {
    /// Creates a new ticket in `Valid` status.
    ///
    /// Tickets are minted at order completion, outside this core; this
    /// constructor exists for seeding stores and tests.
    #[must_use]
    pub fn new(
        event_id: EventId,
        tier_id: TierId,
        owner_id: UserId,
        face_value: Money,
        price_paid: Money,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: TicketId::new_v4(),
            event_id,
            tier_id,
            current_owner_id: owner_id,
            status: TicketStatus::Valid,
            face_value,
            price_paid,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstructs a ticket from storage.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: TicketId,
        event_id: EventId,
        tier_id: TierId,
        current_owner_id: UserId,
        status: TicketStatus,
        face_value: Money,
        price_paid: Money,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            event_id,
            tier_id,
            current_owner_id,
            status,
            face_value,
            price_paid,
            created_at,
            updated_at,
        }
    }

    // ========== Lifecycle ==========

    /// Encumbers the ticket with an active resale listing.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTicketTransition`] unless the ticket
    /// is `Valid`.
    pub fn mark_listed(&mut self, now: Timestamp) -> DomainResult<()> {
        self.transition_to(TicketStatus::ListedForSale, now)
    }

    /// Encumbers the ticket with a pending transfer.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTicketTransition`] unless the ticket
    /// is `Valid`.
    pub fn mark_pending_transfer(&mut self, now: Timestamp) -> DomainResult<()> {
        self.transition_to(TicketStatus::PendingTransfer, now)
    }

    /// Releases an encumbrance, returning the ticket to `Valid` under its
    /// current owner (listing cancelled/expired, transfer rejected/
    /// cancelled/expired).
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTicketTransition`] unless the ticket
    /// is currently encumbered.
    pub fn release(&mut self, now: Timestamp) -> DomainResult<()> {
        self.transition_to(TicketStatus::Valid, now)
    }

    /// Resolves an encumbrance by moving ownership: resale settlement hands
    /// the ticket to the buyer, transfer acceptance to the recipient. The
    /// ticket comes out `Valid` under the new owner.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidTicketTransition`] unless the ticket
    /// is currently encumbered.
    pub fn hand_over(&mut self, new_owner_id: UserId, now: Timestamp) -> DomainResult<()> {
        self.transition_to(TicketStatus::Valid, now)?;
        self.current_owner_id = new_owner_id;
        Ok(())
    }

    fn transition_to(&mut self, target: TicketStatus, now: Timestamp) -> DomainResult<()> {
        if !self.status.can_transition_to(target) {
            return Err(DomainError::InvalidTicketTransition {
                from: self.status,
                to: target,
            });
        }
        self.status = target;
        self.updated_at = now;
        Ok(())
    }

    // ========== Accessors ==========

    /// Returns the ticket ID.
    #[inline]
    #[must_use]
    pub fn id(&self) -> TicketId {
        self.id
    }

    /// Returns the event ID.
    #[inline]
    #[must_use]
    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    /// Returns the tier ID.
    #[inline]
    #[must_use]
    pub fn tier_id(&self) -> TierId {
        self.tier_id
    }

    /// Returns the current owner's user ID.
    #[inline]
    #[must_use]
    pub fn current_owner_id(&self) -> UserId {
        self.current_owner_id
    }

    /// Returns the current status.
    #[inline]
    #[must_use]
    pub fn status(&self) -> TicketStatus {
        self.status
    }

    /// Returns the face value in minor units.
    #[inline]
    #[must_use]
    pub fn face_value(&self) -> Money {
        self.face_value
    }

    /// Returns the price originally paid in minor units.
    #[inline]
    #[must_use]
    pub fn price_paid(&self) -> Money {
        self.price_paid
    }

    /// Returns when this ticket was created.
    #[inline]
    #[must_use]
    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// Returns when this ticket was last updated.
    #[inline]
    #[must_use]
    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    // ========== State Helpers ==========

    /// Returns true if `user_id` currently owns this ticket.
    #[inline]
    #[must_use]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.current_owner_id == user_id
    }

    /// Returns true if the ticket is free to list or transfer.
    #[inline]
    #[must_use]
    pub fn is_sellable(&self) -> bool {
        self.status.is_sellable()
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Ticket {{ id: {}, owner: {}, status: {} }}",
            self.id, self.current_owner_id, self.status
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn ticket() -> Ticket {
        Ticket::new(
            EventId::new_v4(),
            TierId::new_v4(),
            UserId::new_v4(),
            Money::from_minor(10_000).unwrap(),
            Money::from_minor(10_800).unwrap(),
        )
    }

    #[test]
    fn listing_and_release_round_trip() {
        let mut ticket = ticket();
        let owner = ticket.current_owner_id();
        let now = Timestamp::now();

        ticket.mark_listed(now).unwrap();
        assert_eq!(ticket.status(), TicketStatus::ListedForSale);

        ticket.release(now).unwrap();
        assert_eq!(ticket.status(), TicketStatus::Valid);
        assert_eq!(ticket.current_owner_id(), owner);
    }

    #[test]
    fn hand_over_moves_ownership_and_revalidates() {
        let mut ticket = ticket();
        let buyer = UserId::new_v4();
        let now = Timestamp::now();

        ticket.mark_listed(now).unwrap();
        ticket.hand_over(buyer, now).unwrap();

        assert_eq!(ticket.status(), TicketStatus::Valid);
        assert_eq!(ticket.current_owner_id(), buyer);
    }

    #[test]
    fn cannot_double_encumber() {
        let mut ticket = ticket();
        let now = Timestamp::now();
        ticket.mark_listed(now).unwrap();

        let err = ticket.mark_pending_transfer(now).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidTicketTransition {
                from: TicketStatus::ListedForSale,
                to: TicketStatus::PendingTransfer,
            }
        ));
    }

    #[test]
    fn release_requires_an_encumbrance() {
        let mut ticket = ticket();
        assert!(ticket.release(Timestamp::now()).is_err());
    }

    #[test]
    fn failed_hand_over_leaves_owner_untouched() {
        let mut ticket = ticket();
        let original = ticket.current_owner_id();
        let other = UserId::new_v4();

        assert!(ticket.hand_over(other, Timestamp::now()).is_err());
        assert_eq!(ticket.current_owner_id(), original);
    }
}
