//! Payment gateway port.
//!
//! This trait defines the interface for the external payment provider.
//! Implementations can be HTTP clients, mock providers, etc.

use crate::domain::{Money, PaymentIntent, PaymentMetadata};

/// Error type for payment provider operations.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Payment provider unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid payment provider response: {0}")]
    InvalidResponse(String),
}

/// Port trait for payment providers.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    /// Creates an intent to charge `amount`, tagged with `metadata`.
    async fn create_payment_intent(
        &self,
        amount: Money,
        metadata: PaymentMetadata,
    ) -> Result<PaymentIntent, PaymentError>;

    /// Looks up an intent by id. Unknown ids yield `Ok(None)`.
    async fn retrieve_payment_intent(&self, id: &str)
    -> Result<Option<PaymentIntent>, PaymentError>;
}
