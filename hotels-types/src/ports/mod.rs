//! Port traits (interfaces for adapters).
//!
//! These are the contracts that adapters must implement.
//! The application layer depends on these traits, not concrete implementations.

mod payments;
mod repository;

pub use payments::{PaymentError, PaymentGateway};
pub use repository::HotelRepository;
