//! # Hotels Stripe
//!
//! Outbound adapter implementing the [`PaymentGateway`] port against the
//! Stripe REST API.
//!
//! Only the two calls the booking flow needs are covered:
//! - `POST /v1/payment_intents` (form-encoded) to start a payment
//! - `GET /v1/payment_intents/{id}` to check it before confirming a booking
//!
//! # Example
//! ```no_run
//! use hotels_stripe::StripeGateway;
//!
//! let gateway = StripeGateway::new("sk_test_123");
//! // or point it at a local double:
//! let gateway = StripeGateway::new("sk_test_123").with_base_url("http://127.0.0.1:12111");
//! ```

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use hotels_types::{
    Currency, Money, PaymentError, PaymentGateway, PaymentIntent, PaymentIntentStatus,
    PaymentMetadata,
};

/// Default Stripe API host.
pub const STRIPE_API_BASE: &str = "https://api.stripe.com";

/// Stripe-backed payment gateway.
#[derive(Clone)]
pub struct StripeGateway {
    http: Client,
    api_key: String,
    base_url: String,
}

impl StripeGateway {
    /// Creates a gateway authenticating with the given secret key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            api_key: api_key.into(),
            base_url: STRIPE_API_BASE.to_string(),
        }
    }

    /// Overrides the API host (for stripe-mock or tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_intent(&self, resp: reqwest::Response) -> Result<PaymentIntent, PaymentError> {
        let body = resp
            .text()
            .await
            .map_err(|e| PaymentError::Unavailable(e.to_string()))?;
        let intent: StripePaymentIntent = serde_json::from_str(&body)
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;
        intent.into_domain()
    }
}

/// Payment intent ids are opaque but never contain path separators.
fn is_valid_intent_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StripePaymentIntent {
    id: String,
    amount: i64,
    currency: String,
    status: String,
    client_secret: Option<String>,
    #[serde(default)]
    metadata: PaymentMetadata,
}

impl StripePaymentIntent {
    fn into_domain(self) -> Result<PaymentIntent, PaymentError> {
        let currency: Currency = self
            .currency
            .parse()
            .map_err(|e: hotels_types::DomainError| PaymentError::InvalidResponse(e.to_string()))?;
        let amount = Money::new(self.amount, currency)
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))?;

        Ok(PaymentIntent {
            id: self.id,
            amount,
            status: PaymentIntentStatus::from(self.status.as_str()),
            client_secret: self.client_secret,
            metadata: self.metadata,
        })
    }
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    error: StripeErrorDetail,
}

#[derive(Debug, Deserialize)]
struct StripeErrorDetail {
    message: Option<String>,
}

async fn rejected(resp: reqwest::Response) -> PaymentError {
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<StripeErrorBody>(&body)
        .ok()
        .and_then(|b| b.error.message)
        .unwrap_or(body);
    PaymentError::Rejected { status, message }
}

// ─────────────────────────────────────────────────────────────────────────────
// Port implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl PaymentGateway for StripeGateway {
    #[tracing::instrument(skip(self), fields(amount = amount.amount(), currency = %amount.currency()))]
    async fn create_payment_intent(
        &self,
        amount: Money,
        metadata: PaymentMetadata,
    ) -> Result<PaymentIntent, PaymentError> {
        let params = [
            ("amount", amount.amount().to_string()),
            ("currency", amount.currency().code().to_string()),
            ("metadata[hotel_id]", metadata.hotel_id),
            ("metadata[user_id]", metadata.user_id),
        ];

        let resp = self
            .http
            .post(self.url("/v1/payment_intents"))
            .bearer_auth(&self.api_key)
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::Unavailable(e.to_string()))?;

        if !resp.status().is_success() {
            let err = rejected(resp).await;
            tracing::error!("Failed to create payment intent: {}", err);
            return Err(err);
        }

        let intent = self.read_intent(resp).await?;
        tracing::debug!(payment_intent_id = %intent.id, "Payment intent created");
        Ok(intent)
    }

    #[tracing::instrument(skip(self))]
    async fn retrieve_payment_intent(
        &self,
        id: &str,
    ) -> Result<Option<PaymentIntent>, PaymentError> {
        if !is_valid_intent_id(id) {
            return Ok(None);
        }

        let resp = self
            .http
            .get(self.url(&format!("/v1/payment_intents/{}", id)))
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| PaymentError::Unavailable(e.to_string()))?;

        match resp.status() {
            StatusCode::NOT_FOUND => Ok(None),
            s if s.is_success() => self.read_intent(resp).await.map(Some),
            _ => Err(rejected(resp).await),
        }
    }
}
