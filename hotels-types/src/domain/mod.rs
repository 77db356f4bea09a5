//! Domain models for the hotel booking service.

pub mod booking;
pub mod hotel;
pub mod ids;
pub mod money;
pub mod payment;
pub mod search;
pub mod user;

pub use booking::{Booking, BookingDetails};
pub use hotel::Hotel;
pub use ids::{BookingId, HotelId, UserId};
pub use money::{Currency, Money};
pub use payment::{PaymentIntent, PaymentIntentStatus, PaymentMetadata};
pub use search::{HotelSearch, PAGE_SIZE, SearchPage, SortOption};
pub use user::{NewUser, User};
