//! # Hotels Client SDK
//!
//! A typed Rust client for the Hotel Booking API.

use hotels_types::{
    AuthResponse, Booking, CreateBookingRequest, CreateHotelRequest, Hotel, HotelId,
    HotelSearchQuery, HotelSearchResponse, LoginRequest, PaymentIntentRequest,
    PaymentIntentResponse, RegisterRequest, TokenInfo,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Hotels API client.
///
/// Authenticated calls send the session token as a bearer header. The token
/// is set with [`HotelsClient::with_token`] or captured by
/// [`HotelsClient::register`] and [`HotelsClient::login`].
pub struct HotelsClient {
    base_url: String,
    token: Option<String>,
    http: Client,
}

impl HotelsClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
            http: Client::new(),
        }
    }

    /// Sets the session token for authentication.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// The current session token, if any.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Users / Auth
    // ─────────────────────────────────────────────────────────────────────────

    /// Registers a new user and keeps the issued token.
    pub async fn register(&mut self, req: &RegisterRequest) -> Result<AuthResponse, ClientError> {
        let auth: AuthResponse = self.post("/api/users/register", req).await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    /// Logs in and keeps the issued token.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let req = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let auth: AuthResponse = self.post("/api/auth/login", &req).await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    /// Ends the session on the server and forgets the token.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        let _: serde_json::Value = self.post("/api/auth/logout", &serde_json::json!({})).await?;
        self.token = None;
        Ok(())
    }

    /// Returns the user behind the current token.
    pub async fn validate_token(&self) -> Result<TokenInfo, ClientError> {
        self.get("/api/auth/validate-token").await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Hotels
    // ─────────────────────────────────────────────────────────────────────────

    /// Searches hotels. List filters are sent as repeated query keys.
    pub async fn search_hotels(
        &self,
        query: &HotelSearchQuery,
    ) -> Result<HotelSearchResponse, ClientError> {
        let req = self
            .http
            .get(format!("{}/api/hotels/search", self.base_url))
            .query(&search_params(query));
        self.send(req).await
    }

    /// Lists all hotels.
    pub async fn list_hotels(&self) -> Result<Vec<Hotel>, ClientError> {
        self.get("/api/hotels").await
    }

    /// Gets a hotel by ID.
    pub async fn get_hotel(&self, id: HotelId) -> Result<Hotel, ClientError> {
        self.get(&format!("/api/hotels/{}", id)).await
    }

    /// Lists a new hotel owned by the current user.
    pub async fn create_hotel(&self, req: &CreateHotelRequest) -> Result<Hotel, ClientError> {
        self.post("/api/my-hotels", req).await
    }

    /// Hotels owned by the current user.
    pub async fn my_hotels(&self) -> Result<Vec<Hotel>, ClientError> {
        self.get("/api/my-hotels").await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Bookings
    // ─────────────────────────────────────────────────────────────────────────

    /// Starts paying for `number_of_nights` at a hotel.
    pub async fn create_payment_intent(
        &self,
        hotel_id: HotelId,
        number_of_nights: u32,
    ) -> Result<PaymentIntentResponse, ClientError> {
        let req = PaymentIntentRequest { number_of_nights };
        self.post(
            &format!("/api/hotels/{}/bookings/payment-intent", hotel_id),
            &req,
        )
        .await
    }

    /// Confirms a booking once its payment intent has succeeded.
    pub async fn create_booking(
        &self,
        hotel_id: HotelId,
        req: &CreateBookingRequest,
    ) -> Result<Booking, ClientError> {
        self.post(&format!("/api/hotels/{}/bookings", hotel_id), req)
            .await
    }

    /// Hotels the current user has booked, with only their bookings attached.
    pub async fn my_bookings(&self) -> Result<Vec<Hotel>, ClientError> {
        self.get("/api/my-bookings").await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let req = self.http.get(format!("{}{}", self.base_url, path));
        self.send(req).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let req = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body);
        self.send(req).await
    }

    async fn send<T: DeserializeOwned>(&self, mut req: RequestBuilder) -> Result<T, ClientError> {
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            Ok(serde_json::from_str(&body)?)
        } else {
            let body = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&body)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(body);
            Err(ClientError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

/// Flattens a search query into key/value pairs, repeating list keys.
fn search_params(query: &HotelSearchQuery) -> Vec<(&'static str, String)> {
    let mut params = Vec::new();
    if let Some(destination) = &query.destination {
        params.push(("destination", destination.clone()));
    }
    if let Some(n) = query.adult_count {
        params.push(("adult_count", n.to_string()));
    }
    if let Some(n) = query.child_count {
        params.push(("child_count", n.to_string()));
    }
    params.extend(query.facilities.iter().map(|f| ("facilities", f.clone())));
    params.extend(query.types.iter().map(|t| ("types", t.clone())));
    params.extend(query.stars.iter().map(|s| ("stars", s.to_string())));
    if let Some(price) = query.max_price {
        params.push(("max_price", price.to_string()));
    }
    if let Some(sort) = query.sort_option {
        params.push(("sort_option", sort.as_str().to_string()));
    }
    if let Some(page) = query.page {
        params.push(("page", page.to_string()));
    }
    params
}
