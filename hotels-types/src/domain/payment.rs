//! Payment intent as seen by the booking flow.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{HotelId, UserId};
use super::money::Money;

/// Lifecycle status reported by the payment provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentIntentStatus {
    RequiresPaymentMethod,
    RequiresConfirmation,
    RequiresAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    Other(String),
}

impl PaymentIntentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::RequiresPaymentMethod => "requires_payment_method",
            Self::RequiresConfirmation => "requires_confirmation",
            Self::RequiresAction => "requires_action",
            Self::Processing => "processing",
            Self::RequiresCapture => "requires_capture",
            Self::Canceled => "canceled",
            Self::Succeeded => "succeeded",
            Self::Other(s) => s,
        }
    }
}

impl From<&str> for PaymentIntentStatus {
    fn from(s: &str) -> Self {
        match s {
            "requires_payment_method" => Self::RequiresPaymentMethod,
            "requires_confirmation" => Self::RequiresConfirmation,
            "requires_action" => Self::RequiresAction,
            "processing" => Self::Processing,
            "requires_capture" => Self::RequiresCapture,
            "canceled" => Self::Canceled,
            "succeeded" => Self::Succeeded,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for PaymentIntentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata attached to every intent so a confirmation can be matched
/// back to the hotel and guest that created it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PaymentMetadata {
    #[serde(default)]
    pub hotel_id: String,
    #[serde(default)]
    pub user_id: String,
}

impl PaymentMetadata {
    pub fn new(hotel_id: HotelId, user_id: UserId) -> Self {
        Self {
            hotel_id: hotel_id.to_string(),
            user_id: user_id.to_string(),
        }
    }

    /// True when the intent was created for this hotel and guest.
    pub fn matches(&self, hotel_id: HotelId, user_id: UserId) -> bool {
        self.hotel_id == hotel_id.to_string() && self.user_id == user_id.to_string()
    }
}

/// An authorized-but-not-yet-confirmed charge held by the provider.
#[derive(Debug, Clone)]
pub struct PaymentIntent {
    pub id: String,
    pub amount: Money,
    pub status: PaymentIntentStatus,
    /// Secret the browser uses to complete the payment
    pub client_secret: Option<String>,
    pub metadata: PaymentMetadata,
}

impl PaymentIntent {
    pub fn is_succeeded(&self) -> bool {
        self.status == PaymentIntentStatus::Succeeded
    }
}
