//! # Application Services
//!
//! Services that orchestrate domain logic and infrastructure.
//!
//! This module provides application-level services including:
//! - [`ResaleMarketService`]: Listing lifecycle, purchases, and settlement
//! - [`TicketTransferService`]: Peer-to-peer gifting by email invitation
//! - [`Clock`]: Injectable time source so expiry rules are testable
//! - [`EventPublisher`]: Post-commit fan-out of domain events

pub mod clock;
pub mod publisher;
pub mod resale_market;
pub mod ticket_transfers;

pub use clock::{Clock, ManualClock, SystemClock};
pub use publisher::{
    EventPublisher, LoggingPublisher, PublishError, PublishResult, RecordingPublisher,
};
pub use resale_market::{ResaleMarketConfig, ResaleMarketService};
pub use ticket_transfers::{TicketTransferService, TransferConfig};
