//! Repository port trait.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (Postgres, SQLite, in-memory mocks) implement this trait.

use crate::domain::{Booking, Hotel, HotelId, HotelSearch, NewUser, SearchPage, User, UserId};
use crate::error::RepoError;

/// The main repository port for hotels, bookings and users.
#[async_trait::async_trait]
pub trait HotelRepository: Send + Sync + 'static {
    // ─────────────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────────────

    /// Persists a new user. Fails with `Conflict` if the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError>;

    /// Finds a user by (lowercased) email.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Gets a user by ID.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Hotels
    // ─────────────────────────────────────────────────────────────────────────────

    /// Persists a new hotel.
    async fn create_hotel(&self, hotel: Hotel) -> Result<Hotel, RepoError>;

    /// Gets a hotel, with its bookings, by ID.
    async fn get_hotel(&self, id: HotelId) -> Result<Option<Hotel>, RepoError>;

    /// Lists all hotels, most recently updated first.
    async fn list_hotels(&self) -> Result<Vec<Hotel>, RepoError>;

    /// Lists hotels listed by `owner`, most recently updated first.
    async fn list_hotels_by_owner(&self, owner: UserId) -> Result<Vec<Hotel>, RepoError>;

    /// Returns one page of hotels matching `search`, plus the total match count.
    async fn search_hotels(&self, search: &HotelSearch) -> Result<SearchPage, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Bookings
    // ─────────────────────────────────────────────────────────────────────────────

    /// Appends a booking to its hotel.
    ///
    /// Fails with `NotFound` if the hotel does not exist and with `Conflict`
    /// if the payment intent was already used for a booking.
    async fn add_booking(&self, booking: Booking) -> Result<Booking, RepoError>;

    /// Hotels the user has booked, each carrying only that user's bookings.
    async fn list_hotels_booked_by(&self, user: UserId) -> Result<Vec<Hotel>, RepoError>;
}
