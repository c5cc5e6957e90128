//! # Data Transfer Objects
//!
//! DTOs for service input/output, decoupling API from domain.
//!
//! These objects provide a clean interface between the API layer and
//! the application layer, handling validation and serialization.

pub mod listing_dto;
pub mod transfer_dto;

pub use listing_dto::{
    CreateListingRequest, CreateListingResponse, ListingDetails, PaymentHandle, PriceBreakdown,
    PurchaseListingRequest, PurchaseListingResponse, SettlePurchaseRequest, SettlePurchaseResponse,
    UpdateListingRequest,
};
pub use transfer_dto::{
    CreateTransferRequest, CreateTransferResponse, GetTransferResponse, RespondToTransferRequest,
    RespondToTransferResponse, TransferDetails, UserTransfersResponse,
};
