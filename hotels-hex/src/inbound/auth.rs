//! Session tokens and the authentication middleware.
//!
//! Tokens are HS256 JWTs whose `sub` is the user id. They are accepted from
//! the `auth_token` cookie (browser sessions) or an `Authorization: Bearer`
//! header (SDK and CLI).

use std::sync::Arc;

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use hotels_types::{AppError, HotelRepository, PaymentGateway, UserId};

use super::handlers::AppState;

/// Name of the session cookie.
pub const AUTH_COOKIE: &str = "auth_token";

/// How long an issued token stays valid.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// JWT claims.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// Signing and verification keys derived from the shared secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Issues a session token for `user_id`.
    pub fn issue(&self, user_id: UserId) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            tracing::error!("Failed to sign session token: {}", e);
            AppError::Internal(e.to_string())
        })
    }

    /// Returns the user a token was issued to, or `None` if it is invalid or expired.
    pub fn verify(&self, token: &str) -> Option<UserId> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|e| tracing::debug!("Rejected session token: {}", e))
            .ok()?;
        data.claims.sub.parse().ok()
    }
}

/// The authenticated caller, inserted as a request extension.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub UserId);

/// Reads the session token from the cookie, falling back to the bearer header.
pub(crate) fn extract_token(headers: &HeaderMap) -> Option<String> {
    if let Some(cookie) = CookieJar::from_headers(headers).get(AUTH_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}

/// Rejects requests without a valid session and records the caller otherwise.
pub async fn auth_middleware<R: HotelRepository, P: PaymentGateway>(
    State(state): State<Arc<AppState<R, P>>>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let user_id = extract_token(request.headers()).and_then(|t| state.tokens.verify(&t));

    match user_id {
        Some(user_id) => {
            request.extensions_mut().insert(AuthUser(user_id));
            next.run(request).await
        }
        None => unauthorized_response(),
    }
}

fn unauthorized_response() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({ "error": "Unauthorized" })),
    )
        .into_response()
}
