//! # Domain Entities
//!
//! Aggregate roots and entities representing core business concepts.
//!
//! ## Aggregates
//!
//! - [`Ticket`]: Admission right with ownership and encumbrance state
//! - [`TicketListing`]: Fixed-price resale offer
//! - [`TicketTransfer`]: Email-addressed hand-off with a claim token
//!
//! ## Reference Data
//!
//! - [`Event`]: Schedule and resale policy, owned by the organizer side
//! - [`User`]: Account slice used for authorization and email matching

pub mod event;
pub mod listing;
pub mod ticket;
pub mod transfer;
pub mod user;

pub use event::{Event, EventBuilder};
pub use listing::TicketListing;
pub use ticket::Ticket;
pub use transfer::TicketTransfer;
pub use user::User;
