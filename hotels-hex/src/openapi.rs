//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use hotels_types::domain::{Booking, BookingId, Hotel, HotelId, SortOption, UserId};
use hotels_types::dto::{
    AuthResponse, CreateBookingRequest, CreateHotelRequest, HotelSearchQuery, HotelSearchResponse,
    LoginRequest, PaginationMeta, PaymentIntentRequest, PaymentIntentResponse, RegisterRequest,
    TokenInfo,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, Http, HttpAuthScheme, SecurityScheme},
};

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Register a new user and start a session
#[utoipa::path(
    post,
    path = "/api/users/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User registered; `auth_token` cookie set", body = AuthResponse),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "User already exists")
    )
)]
async fn register() {}

/// Log in with email and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in; `auth_token` cookie set", body = AuthResponse),
        (status = 400, description = "Invalid credentials")
    )
)]
async fn login() {}

/// Clear the session cookie
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Session cookie cleared")
    )
)]
async fn logout() {}

/// Check the current session
#[utoipa::path(
    get,
    path = "/api/auth/validate-token",
    tag = "auth",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Session is valid", body = TokenInfo),
        (status = 401, description = "Unauthorized")
    )
)]
async fn validate_token() {}

/// Search hotels
#[utoipa::path(
    get,
    path = "/api/hotels/search",
    tag = "hotels",
    params(HotelSearchQuery),
    responses(
        (status = 200, description = "One page of matching hotels", body = HotelSearchResponse),
        (status = 400, description = "Invalid query")
    )
)]
async fn search_hotels() {}

/// List all hotels, most recently updated first
#[utoipa::path(
    get,
    path = "/api/hotels",
    tag = "hotels",
    responses(
        (status = 200, description = "All hotels", body = Vec<Hotel>)
    )
)]
async fn list_hotels() {}

/// Get a hotel by ID
#[utoipa::path(
    get,
    path = "/api/hotels/{hotel_id}",
    tag = "hotels",
    params(
        ("hotel_id" = HotelId, Path, description = "Hotel ID (UUID)")
    ),
    responses(
        (status = 200, description = "Hotel details", body = Hotel),
        (status = 400, description = "Invalid hotel ID"),
        (status = 404, description = "Hotel not found")
    )
)]
async fn get_hotel() {}

/// Start paying for a stay
#[utoipa::path(
    post,
    path = "/api/hotels/{hotel_id}/bookings/payment-intent",
    tag = "bookings",
    params(
        ("hotel_id" = HotelId, Path, description = "Hotel ID (UUID)")
    ),
    request_body = PaymentIntentRequest,
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Payment intent created", body = PaymentIntentResponse),
        (status = 400, description = "Invalid number of nights"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Hotel not found"),
        (status = 500, description = "Payment provider failure")
    )
)]
async fn create_payment_intent() {}

/// Confirm a booking after payment
#[utoipa::path(
    post,
    path = "/api/hotels/{hotel_id}/bookings",
    tag = "bookings",
    params(
        ("hotel_id" = HotelId, Path, description = "Hotel ID (UUID)")
    ),
    request_body = CreateBookingRequest,
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Booking confirmed", body = Booking),
        (status = 400, description = "Payment intent not found, mismatched or not succeeded"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Hotel not found"),
        (status = 409, description = "Payment intent already used")
    )
)]
async fn create_booking() {}

/// List a new hotel
#[utoipa::path(
    post,
    path = "/api/my-hotels",
    tag = "my-hotels",
    request_body = CreateHotelRequest,
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 201, description = "Hotel created", body = Hotel),
        (status = 400, description = "Invalid request"),
        (status = 401, description = "Unauthorized")
    )
)]
async fn create_my_hotel() {}

/// Hotels owned by the caller
#[utoipa::path(
    get,
    path = "/api/my-hotels",
    tag = "my-hotels",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Owned hotels", body = Vec<Hotel>),
        (status = 401, description = "Unauthorized")
    )
)]
async fn list_my_hotels() {}

/// Hotels the caller has booked, with only the caller's bookings
#[utoipa::path(
    get,
    path = "/api/my-bookings",
    tag = "bookings",
    security(("bearer_auth" = []), ("cookie_auth" = [])),
    responses(
        (status = 200, description = "Booked hotels", body = Vec<Hotel>),
        (status = 401, description = "Unauthorized")
    )
)]
async fn my_bookings() {}

/// OpenAPI documentation for the Hotels API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Hotel Booking API",
        version = "1.0.0",
        description = "Hotel search, listings and a two-step booking flow backed by Stripe payment intents.\n\n## Authentication\n\nRegister or log in to receive a session. Browsers use the `auth_token` cookie; other clients send the returned token as:\n\n```\nAuthorization: Bearer <token>\n```",
        license(name = "MIT"),
    ),
    paths(
        health,
        register,
        login,
        logout,
        validate_token,
        search_hotels,
        list_hotels,
        get_hotel,
        create_payment_intent,
        create_booking,
        create_my_hotel,
        list_my_hotels,
        my_bookings,
    ),
    components(
        schemas(
            Hotel,
            Booking,
            HotelId,
            UserId,
            BookingId,
            SortOption,
            RegisterRequest,
            LoginRequest,
            AuthResponse,
            TokenInfo,
            CreateHotelRequest,
            HotelSearchResponse,
            PaginationMeta,
            PaymentIntentRequest,
            PaymentIntentResponse,
            CreateBookingRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Registration and sessions"),
        (name = "hotels", description = "Hotel search and details"),
        (name = "bookings", description = "Payment intents and bookings"),
        (name = "my-hotels", description = "Hotels listed by the caller"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for bearer and cookie sessions.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
            components.add_security_scheme(
                "cookie_auth",
                SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new("auth_token"))),
            );
        }
    }
}
