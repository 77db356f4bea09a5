//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::{
    Query, QueryRejection,
    cookie::{Cookie, CookieJar, SameSite},
};

use hotels_types::{
    AppError, AuthResponse, CreateBookingRequest, CreateHotelRequest, HotelId, HotelRepository,
    HotelSearchQuery, LoginRequest, PaymentGateway, PaymentIntentRequest, RegisterRequest,
    TokenInfo, User,
};

use super::auth::{AUTH_COOKIE, AuthUser, TokenKeys};
use crate::HotelService;

/// Application state shared across handlers.
pub struct AppState<R: HotelRepository, P: PaymentGateway> {
    pub service: HotelService<R, P>,
    pub tokens: TokenKeys,
    /// Sets the `Secure` flag on the session cookie
    pub secure_cookies: bool,
}

impl<R: HotelRepository, P: PaymentGateway> AppState<R, P> {
    pub fn new(service: HotelService<R, P>, tokens: TokenKeys) -> Self {
        Self {
            service,
            tokens,
            secure_cookies: false,
        }
    }

    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(AppError::BadRequest(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong".to_string(),
                )
            }
        };

        let body = serde_json::json!({
            "error": message,
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

fn parse_hotel_id(id: &str) -> Result<HotelId, ApiError> {
    id.parse()
        .map_err(|_| AppError::BadRequest("Invalid hotel ID".into()).into())
}

/// Issues a token for `user` and sets it as the session cookie.
fn start_session<R: HotelRepository, P: PaymentGateway>(
    state: &AppState<R, P>,
    jar: CookieJar,
    user: &User,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    let token = state.tokens.issue(user.id)?;

    let cookie = Cookie::build((AUTH_COOKIE, token.clone()))
        .http_only(true)
        .secure(state.secure_cookies)
        .same_site(SameSite::Lax)
        .path("/");

    Ok((
        jar.add(cookie),
        Json(AuthResponse {
            user_id: user.id,
            token,
        }),
    ))
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Users / Auth
// ─────────────────────────────────────────────────────────────────────────────

#[tracing::instrument(skip_all)]
pub async fn register<R: HotelRepository, P: PaymentGateway>(
    State(state): State<Arc<AppState<R, P>>>,
    jar: CookieJar,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let user = state.service.register(req).await?;
    let (jar, body) = start_session(&state, jar, &user)?;
    Ok((StatusCode::CREATED, jar, body))
}

#[tracing::instrument(skip_all)]
pub async fn login<R: HotelRepository, P: PaymentGateway>(
    State(state): State<Arc<AppState<R, P>>>,
    jar: CookieJar,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let user = state.service.login(req).await?;
    tracing::info!(user_id = %user.id, "User logged in");
    start_session(&state, jar, &user)
}

/// Clears the session cookie.
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (
        jar.remove(Cookie::build(AUTH_COOKIE).path("/")),
        Json(serde_json::json!({ "message": "Signed out" })),
    )
}

pub async fn validate_token(Extension(AuthUser(user_id)): Extension<AuthUser>) -> impl IntoResponse {
    Json(TokenInfo { user_id })
}

// ─────────────────────────────────────────────────────────────────────────────
// Hotels
// ─────────────────────────────────────────────────────────────────────────────

/// Search hotels with filters, sorting and pagination.
#[tracing::instrument(skip_all)]
pub async fn search_hotels<R: HotelRepository, P: PaymentGateway>(
    State(state): State<Arc<AppState<R, P>>>,
    query: Result<Query<HotelSearchQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.to_string()))?;
    tracing::debug!(?query, "Searching hotels");

    let response = state.service.search_hotels(query).await?;
    Ok(Json(response))
}

/// List all hotels.
#[tracing::instrument(skip_all)]
pub async fn list_hotels<R: HotelRepository, P: PaymentGateway>(
    State(state): State<Arc<AppState<R, P>>>,
) -> Result<impl IntoResponse, ApiError> {
    let hotels = state.service.list_hotels().await?;
    Ok(Json(hotels))
}

/// Get hotel by ID.
#[tracing::instrument(skip_all, fields(hotel_id = %id))]
pub async fn get_hotel<R: HotelRepository, P: PaymentGateway>(
    State(state): State<Arc<AppState<R, P>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let hotel = state.service.get_hotel(parse_hotel_id(&id)?).await?;
    Ok(Json(hotel))
}

#[tracing::instrument(skip_all, fields(owner_id = %owner))]
pub async fn create_my_hotel<R: HotelRepository, P: PaymentGateway>(
    State(state): State<Arc<AppState<R, P>>>,
    Extension(AuthUser(owner)): Extension<AuthUser>,
    body: Result<Json<CreateHotelRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let hotel = state.service.create_hotel(owner, req).await?;
    Ok((StatusCode::CREATED, Json(hotel)))
}

#[tracing::instrument(skip_all, fields(owner_id = %owner))]
pub async fn list_my_hotels<R: HotelRepository, P: PaymentGateway>(
    State(state): State<Arc<AppState<R, P>>>,
    Extension(AuthUser(owner)): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let hotels = state.service.list_my_hotels(owner).await?;
    Ok(Json(hotels))
}

// ─────────────────────────────────────────────────────────────────────────────
// Bookings
// ─────────────────────────────────────────────────────────────────────────────

/// Start paying for a stay.
#[tracing::instrument(skip_all, fields(hotel_id = %hotel_id, user_id = %user_id))]
pub async fn create_payment_intent<R: HotelRepository, P: PaymentGateway>(
    State(state): State<Arc<AppState<R, P>>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(hotel_id): Path<String>,
    body: Result<Json<PaymentIntentRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    tracing::debug!(nights = req.number_of_nights, "Creating payment intent");
    let response = state
        .service
        .create_payment_intent(parse_hotel_id(&hotel_id)?, user_id, req)
        .await?;
    Ok(Json(response))
}

/// Confirm a booking once the payment has gone through.
#[tracing::instrument(skip_all, fields(hotel_id = %hotel_id, user_id = %user_id))]
pub async fn create_booking<R: HotelRepository, P: PaymentGateway>(
    State(state): State<Arc<AppState<R, P>>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
    Path(hotel_id): Path<String>,
    body: Result<Json<CreateBookingRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = body?;
    let booking = state
        .service
        .create_booking(parse_hotel_id(&hotel_id)?, user_id, req)
        .await?;
    Ok(Json(booking))
}

#[tracing::instrument(skip_all, fields(user_id = %user_id))]
pub async fn my_bookings<R: HotelRepository, P: PaymentGateway>(
    State(state): State<Arc<AppState<R, P>>>,
    Extension(AuthUser(user_id)): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let hotels = state.service.my_bookings(user_id).await?;
    Ok(Json(hotels))
}
