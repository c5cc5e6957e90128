//! # Value Objects
//!
//! Immutable types with validation and domain semantics.
//!
//! ## Identity Types
//!
//! - [`TicketId`], [`ListingId`], [`TransferId`], [`EventId`], [`TierId`],
//!   [`UserId`]: UUID-based identifiers
//! - [`PaymentIntentId`]: gateway-assigned string identifier
//! - [`TransferToken`]: globally unique external lookup key for transfers
//!
//! ## Money & Time
//!
//! - [`Money`]: integer minor-currency-unit amounts with checked arithmetic
//! - [`Timestamp`]: UTC instants with lifecycle duration helpers
//!
//! ## State Machines
//!
//! - [`TicketStatus`]: Valid ⇄ ListedForSale / PendingTransfer, plus
//!   terminal Used/Cancelled
//! - [`ListingStatus`]: Active → Sold / Cancelled / Expired
//! - [`TransferStatus`]: Pending → Accepted / Rejected / Expired / Cancelled
//!
//! ## Domain Enums
//!
//! - [`EventStatus`]: event lifecycle (read-only input)
//! - [`ResaleCapType`]: resale price-cap policy selector
//! - [`TransferResponse`]: Accept or Reject
//!
//! ## Addressing
//!
//! - [`EmailAddress`]: normalized recipient addresses

pub mod email;
pub mod enums;
pub mod ids;
pub mod listing_status;
pub mod money;
pub mod ticket_status;
pub mod timestamp;
pub mod transfer_status;
pub mod transfer_token;

pub use email::{EmailAddress, EmailError};
pub use enums::{EventStatus, ParseEnumError, ResaleCapType, TransferResponse};
pub use ids::{EventId, ListingId, PaymentIntentId, TicketId, TierId, TransferId, UserId};
pub use listing_status::{InvalidListingStatusError, ListingStatus};
pub use money::{Money, MoneyError};
pub use ticket_status::{InvalidTicketStatusError, TicketStatus};
pub use timestamp::Timestamp;
pub use transfer_status::{InvalidTransferStatusError, TransferStatus};
pub use transfer_token::TransferToken;
