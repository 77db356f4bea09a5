//! # Hotels Types
//!
//! Domain types and port traits for the hotel booking service.
//! This crate has ZERO external IO dependencies - only data structures,
//! business rules, and trait definitions.
//!
//! ## Architecture
//!
//! This crate represents the **innermost core** of the hexagonal architecture:
//! - `domain/` - Pure domain types (Hotel, Booking, User, Money, search criteria)
//! - `ports/` - Trait definitions that adapters must implement
//! - `dto/` - Data Transfer Objects for API boundaries
//! - `error/` - Domain and application error types

pub mod domain;
pub mod dto;
pub mod error;
pub mod ports;

// Re-export commonly used types
pub use domain::{
    Booking, BookingDetails, BookingId, Currency, Hotel, HotelId, HotelSearch, Money, NewUser,
    PAGE_SIZE, PaymentIntent, PaymentIntentStatus, PaymentMetadata, SearchPage, SortOption, User,
    UserId,
};
pub use dto::*;
pub use error::{AppError, DomainError, RepoError};
pub use ports::{HotelRepository, PaymentError, PaymentGateway};
