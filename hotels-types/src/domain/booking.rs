//! Booking domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{BookingId, HotelId, UserId};
use super::payment::PaymentIntent;
use crate::error::DomainError;

/// A confirmed stay, recorded against a hotel once its payment succeeded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    pub id: BookingId,
    pub hotel_id: HotelId,
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub adult_count: u32,
    pub child_count: u32,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
    /// Amount charged, in the smallest currency unit
    pub total_cost: i64,
    /// Provider payment intent that paid for this stay
    pub payment_intent_id: String,
    pub created_at: DateTime<Utc>,
}

/// Guest-supplied details for a booking.
#[derive(Debug, Clone)]
pub struct BookingDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub adult_count: u32,
    pub child_count: u32,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
}

impl Booking {
    /// Builds a booking paid for by `intent`.
    ///
    /// The charged amount comes from the intent, not from the client.
    pub fn confirm(
        hotel_id: HotelId,
        user_id: UserId,
        intent: &PaymentIntent,
        details: BookingDetails,
    ) -> Result<Self, DomainError> {
        if details.check_out <= details.check_in {
            return Err(DomainError::InvalidStay(
                "check_out must be after check_in".into(),
            ));
        }
        if details.adult_count == 0 {
            return Err(DomainError::ValidationError(
                "adult_count must be at least 1".into(),
            ));
        }

        Ok(Self {
            id: BookingId::new(),
            hotel_id,
            user_id,
            first_name: details.first_name,
            last_name: details.last_name,
            email: details.email,
            adult_count: details.adult_count,
            child_count: details.child_count,
            check_in: details.check_in,
            check_out: details.check_out,
            total_cost: intent.amount.amount(),
            payment_intent_id: intent.id.clone(),
            created_at: Utc::now(),
        })
    }
}
