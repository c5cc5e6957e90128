//! # Application Layer
//!
//! Service orchestration over the domain model.
//!
//! This layer coordinates domain objects to perform business operations,
//! handling transactions, authorization, and cross-cutting concerns.
//!
//! ## Services
//!
//! - [`ResaleMarketService`]: List, browse, reprice, cancel, buy, settle
//! - [`TicketTransferService`]: Invite, claim, respond, cancel
//!
//! ## Errors
//!
//! Every operation returns [`MarketResult`]; [`MarketplaceError::kind`]
//! collapses the variants into the coarse classes the REST layer maps to
//! status codes.

pub mod dto;
pub mod error;
pub mod services;

pub use dto::{
    CreateListingRequest, CreateListingResponse, CreateTransferRequest, CreateTransferResponse,
    GetTransferResponse, ListingDetails, PaymentHandle, PriceBreakdown, PurchaseListingRequest,
    PurchaseListingResponse, RespondToTransferRequest, RespondToTransferResponse,
    SettlePurchaseRequest, SettlePurchaseResponse, TransferDetails, UpdateListingRequest,
    UserTransfersResponse,
};
pub use error::{ErrorKind, MarketResult, MarketplaceError};
pub use services::{
    Clock, EventPublisher, LoggingPublisher, ManualClock, PublishError, PublishResult,
    RecordingPublisher, ResaleMarketConfig, ResaleMarketService, SystemClock,
    TicketTransferService, TransferConfig,
};
