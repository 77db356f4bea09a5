//! Data Transfer Objects (DTOs) for requests and responses.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{BookingDetails, Hotel, SortOption, User, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// User / Auth DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[validate(email(message = "must be a valid email address"))]
    #[schema(example = "guest@example.com")]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "is required"))]
    #[schema(example = "Ada")]
    pub first_name: String,
    #[validate(length(min = 1, message = "is required"))]
    #[schema(example = "Lovelace")]
    pub last_name: String,
}

/// Request to log in with email and password.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[validate(email(message = "must be a valid email address"))]
    #[schema(example = "guest@example.com")]
    pub email: String,
    #[validate(length(min = 6, message = "must be at least 6 characters"))]
    pub password: String,
}

/// Session issued after registration or login.
///
/// The same token is also set as the `auth_token` cookie.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: UserId,
    /// JWT for `Authorization: Bearer` use
    pub token: String,
}

/// Identity behind a valid session token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenInfo {
    pub user_id: UserId,
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Hotel DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to list a new hotel.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateHotelRequest {
    #[schema(example = "Seaside Inn")]
    pub name: String,
    #[schema(example = "Brighton")]
    pub city: String,
    #[schema(example = "United Kingdom")]
    pub country: String,
    pub description: String,
    #[schema(example = "Boutique")]
    pub hotel_type: String,
    pub adult_count: u32,
    #[serde(default)]
    pub child_count: u32,
    #[serde(default)]
    #[schema(example = json!(["Free WiFi", "Parking"]))]
    pub facilities: Vec<String>,
    /// Nightly price in the smallest currency unit
    #[schema(example = 9900)]
    pub price_per_night: i64,
    #[schema(example = 4)]
    pub star_rating: u8,
    #[serde(default)]
    pub image_urls: Vec<String>,
}

/// Query parameters for `GET /api/hotels/search`.
///
/// `facilities`, `types` and `stars` may be repeated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct HotelSearchQuery {
    /// Matches city or country, case-insensitively
    pub destination: Option<String>,
    /// Minimum adult capacity
    pub adult_count: Option<u32>,
    /// Minimum child capacity
    pub child_count: Option<u32>,
    /// Required facilities (all must be present)
    #[serde(default)]
    pub facilities: Vec<String>,
    /// Accepted hotel types
    #[serde(default)]
    pub types: Vec<String>,
    /// Accepted star ratings
    #[serde(default)]
    pub stars: Vec<u8>,
    /// Maximum nightly price in the smallest currency unit
    pub max_price: Option<i64>,
    #[param(inline)]
    pub sort_option: Option<SortOption>,
    /// 1-based page number
    pub page: Option<u32>,
}

/// Pagination metadata for a search page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of matching hotels
    pub total: u64,
    pub page: u32,
    /// Total number of pages
    pub pages: u64,
}

/// Response for a hotel search.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HotelSearchResponse {
    pub data: Vec<Hotel>,
    pub pagination: PaginationMeta,
}

// ─────────────────────────────────────────────────────────────────────────────
// Booking DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to start paying for a stay.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentIntentRequest {
    #[schema(example = 3)]
    pub number_of_nights: u32,
}

/// Response after a payment intent has been created.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentIntentResponse {
    #[schema(example = "pi_3Nx...")]
    pub payment_intent_id: String,
    /// Secret the browser passes to the payment provider
    pub client_secret: String,
    /// Amount to be charged, in the smallest currency unit
    #[schema(example = 29700)]
    pub total_cost: i64,
}

/// Request to confirm a booking after payment.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateBookingRequest {
    #[validate(length(min = 1, message = "is required"))]
    pub payment_intent_id: String,
    #[validate(length(min = 1, message = "is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "is required"))]
    pub last_name: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    pub adult_count: u32,
    #[serde(default)]
    pub child_count: u32,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
}

impl CreateBookingRequest {
    /// Splits the request into the intent id and the guest details.
    pub fn into_parts(self) -> (String, BookingDetails) {
        (
            self.payment_intent_id,
            BookingDetails {
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                adult_count: self.adult_count,
                child_count: self.child_count,
                check_in: self.check_in,
                check_out: self.check_out,
            },
        )
    }
}
