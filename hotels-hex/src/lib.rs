//! # Hotels Hex
//!
//! Application service layer and HTTP adapter for the hotel booking service.
//!
//! ## Architecture
//!
//! - `service/` - Application service (orchestrates domain operations)
//! - `inbound/` - HTTP adapter (Axum server, auth, rate limiting)
//! - `openapi/` - OpenAPI document served by Swagger UI
//!
//! The service is generic over `R: HotelRepository` and `P: PaymentGateway`,
//! allowing different adapters to be injected.

pub mod inbound;
pub mod openapi;
pub mod service;

#[cfg(test)]
mod service_tests;

pub use service::HotelService;
