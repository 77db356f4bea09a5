//! Hotel domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::booking::Booking;
use super::ids::{HotelId, UserId};
use super::money::{Currency, Money};
use crate::dto::CreateHotelRequest;
use crate::error::DomainError;

/// A bookable hotel listing.
///
/// Bookings are owned by the hotel: a confirmed stay is appended to
/// `bookings` and never edited afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Hotel {
    pub id: HotelId,
    /// User who listed the hotel
    pub owner_id: UserId,
    #[schema(example = "The Grand Budapest")]
    pub name: String,
    #[schema(example = "Zubrowka")]
    pub city: String,
    #[schema(example = "Republic of Zubrowka")]
    pub country: String,
    pub description: String,
    /// Category such as "Boutique" or "Budget"
    #[schema(example = "Boutique")]
    pub hotel_type: String,
    /// Maximum adults per booking
    pub adult_count: u32,
    /// Maximum children per booking
    pub child_count: u32,
    #[schema(example = json!(["Free WiFi", "Parking"]))]
    pub facilities: Vec<String>,
    /// Nightly price in the smallest currency unit
    #[schema(example = 12500)]
    pub price_per_night: i64,
    #[schema(example = 4, minimum = 1, maximum = 5)]
    pub star_rating: u8,
    pub image_urls: Vec<String>,
    pub last_updated: DateTime<Utc>,
    pub bookings: Vec<Booking>,
}

impl Hotel {
    /// Creates a new listing owned by `owner`.
    pub fn new(owner_id: UserId, req: CreateHotelRequest) -> Result<Self, DomainError> {
        let required = [
            ("name", &req.name),
            ("city", &req.city),
            ("country", &req.country),
            ("description", &req.description),
            ("hotel_type", &req.hotel_type),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(DomainError::ValidationError(format!(
                    "{} is required",
                    field
                )));
            }
        }

        if !(1..=5).contains(&req.star_rating) {
            return Err(DomainError::ValidationError(
                "star_rating must be between 1 and 5".into(),
            ));
        }
        if req.price_per_night < 0 {
            return Err(DomainError::NegativeAmount);
        }
        if req.adult_count == 0 {
            return Err(DomainError::ValidationError(
                "adult_count must be at least 1".into(),
            ));
        }

        Ok(Self {
            id: HotelId::new(),
            owner_id,
            name: req.name.trim().to_string(),
            city: req.city.trim().to_string(),
            country: req.country.trim().to_string(),
            description: req.description,
            hotel_type: req.hotel_type.trim().to_string(),
            adult_count: req.adult_count,
            child_count: req.child_count,
            facilities: req
                .facilities
                .into_iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect(),
            price_per_night: req.price_per_night,
            star_rating: req.star_rating,
            image_urls: req.image_urls,
            last_updated: Utc::now(),
            bookings: Vec::new(),
        })
    }

    /// Nightly price as money in the given currency.
    pub fn nightly_rate(&self, currency: Currency) -> Result<Money, DomainError> {
        Money::new(self.price_per_night, currency)
    }

    /// Cost of staying `nights` nights.
    pub fn total_cost(&self, nights: u32, currency: Currency) -> Result<Money, DomainError> {
        if nights == 0 {
            return Err(DomainError::InvalidStay(
                "number_of_nights must be at least 1".into(),
            ));
        }
        self.nightly_rate(currency)?.checked_mul(nights)
    }
}
