//! Database row types and the conversions shared by both adapters.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use hotels_types::{Booking, BookingId, Hotel, HotelId, RepoError, User, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Shared helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Maps a write failure, turning unique-constraint violations into `Conflict`.
pub(crate) fn write_err(e: sqlx::Error, conflict: &str) -> RepoError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            RepoError::Conflict(conflict.to_string())
        }
        _ => RepoError::Database(e.to_string()),
    }
}

pub(crate) fn db_err(e: sqlx::Error) -> RepoError {
    RepoError::Database(e.to_string())
}

fn to_u32(column: &str, value: i64) -> Result<u32, RepoError> {
    u32::try_from(value)
        .map_err(|_| RepoError::Database(format!("{} out of range: {}", column, value)))
}

fn to_u8(column: &str, value: i64) -> Result<u8, RepoError> {
    u8::try_from(value)
        .map_err(|_| RepoError::Database(format!("{} out of range: {}", column, value)))
}

/// Groups bookings under their hotels, preserving hotel order.
pub(crate) fn attach_bookings(mut hotels: Vec<Hotel>, bookings: Vec<Booking>) -> Vec<Hotel> {
    let mut by_hotel: HashMap<HotelId, Vec<Booking>> = HashMap::new();
    for booking in bookings {
        by_hotel.entry(booking.hotel_id).or_default().push(booking);
    }
    for hotel in &mut hotels {
        if let Some(bookings) = by_hotel.remove(&hotel.id) {
            hotel.bookings = bookings;
        }
    }
    hotels
}

// ─────────────────────────────────────────────────────────────────────────────
// SQLite rows: ids and timestamps as TEXT, lists as JSON TEXT
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "sqlite")]
pub(crate) mod sqlite_rows {
    use super::*;
    use chrono::SecondsFormat;
    use uuid::Uuid;

    /// Fixed-width RFC 3339 so that TEXT ordering matches time ordering.
    pub(crate) fn ts(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_uuid(s: &str) -> Result<Uuid, RepoError> {
        Uuid::parse_str(s).map_err(|e| RepoError::Database(e.to_string()))
    }

    fn parse_ts(s: &str) -> Result<DateTime<Utc>, RepoError> {
        Ok(DateTime::parse_from_rfc3339(s)
            .map_err(|e| RepoError::Database(e.to_string()))?
            .with_timezone(&Utc))
    }

    fn parse_list(s: &str) -> Result<Vec<String>, RepoError> {
        serde_json::from_str(s).map_err(|e| RepoError::Database(e.to_string()))
    }

    pub(crate) fn encode_list(list: &[String]) -> Result<String, RepoError> {
        serde_json::to_string(list).map_err(|e| RepoError::Database(e.to_string()))
    }

    #[derive(FromRow)]
    pub(crate) struct DbSqliteUser {
        pub id: String,
        pub email: String,
        pub first_name: String,
        pub last_name: String,
        pub password_hash: String,
        pub created_at: String,
    }

    impl DbSqliteUser {
        pub(crate) fn into_domain(self) -> Result<User, RepoError> {
            Ok(User {
                id: UserId::from_uuid(parse_uuid(&self.id)?),
                email: self.email,
                first_name: self.first_name,
                last_name: self.last_name,
                password_hash: self.password_hash,
                created_at: parse_ts(&self.created_at)?,
            })
        }
    }

    #[derive(FromRow)]
    pub(crate) struct DbSqliteHotel {
        pub id: String,
        pub owner_id: String,
        pub name: String,
        pub city: String,
        pub country: String,
        pub description: String,
        pub hotel_type: String,
        pub adult_count: i64,
        pub child_count: i64,
        pub facilities: String,
        pub price_per_night: i64,
        pub star_rating: i64,
        pub image_urls: String,
        pub last_updated: String,
    }

    impl DbSqliteHotel {
        /// Converts without bookings; callers attach them separately.
        pub(crate) fn into_domain(self) -> Result<Hotel, RepoError> {
            Ok(Hotel {
                id: HotelId::from_uuid(parse_uuid(&self.id)?),
                owner_id: UserId::from_uuid(parse_uuid(&self.owner_id)?),
                name: self.name,
                city: self.city,
                country: self.country,
                description: self.description,
                hotel_type: self.hotel_type,
                adult_count: to_u32("adult_count", self.adult_count)?,
                child_count: to_u32("child_count", self.child_count)?,
                facilities: parse_list(&self.facilities)?,
                price_per_night: self.price_per_night,
                star_rating: to_u8("star_rating", self.star_rating)?,
                image_urls: parse_list(&self.image_urls)?,
                last_updated: parse_ts(&self.last_updated)?,
                bookings: Vec::new(),
            })
        }
    }

    #[derive(FromRow)]
    pub(crate) struct DbSqliteBooking {
        pub id: String,
        pub hotel_id: String,
        pub user_id: String,
        pub first_name: String,
        pub last_name: String,
        pub email: String,
        pub adult_count: i64,
        pub child_count: i64,
        pub check_in: String,
        pub check_out: String,
        pub total_cost: i64,
        pub payment_intent_id: String,
        pub created_at: String,
    }

    impl DbSqliteBooking {
        pub(crate) fn into_domain(self) -> Result<Booking, RepoError> {
            Ok(Booking {
                id: BookingId::from_uuid(parse_uuid(&self.id)?),
                hotel_id: HotelId::from_uuid(parse_uuid(&self.hotel_id)?),
                user_id: UserId::from_uuid(parse_uuid(&self.user_id)?),
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                adult_count: to_u32("adult_count", self.adult_count)?,
                child_count: to_u32("child_count", self.child_count)?,
                check_in: parse_ts(&self.check_in)?,
                check_out: parse_ts(&self.check_out)?,
                total_cost: self.total_cost,
                payment_intent_id: self.payment_intent_id,
                created_at: parse_ts(&self.created_at)?,
            })
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL rows: native UUID, TIMESTAMPTZ and JSONB
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "postgres")]
pub(crate) mod pg_rows {
    use super::*;
    use sqlx::types::Json;
    use uuid::Uuid;

    #[derive(FromRow)]
    pub(crate) struct DbPgUser {
        pub id: Uuid,
        pub email: String,
        pub first_name: String,
        pub last_name: String,
        pub password_hash: String,
        pub created_at: DateTime<Utc>,
    }

    impl DbPgUser {
        pub(crate) fn into_domain(self) -> User {
            User {
                id: UserId::from_uuid(self.id),
                email: self.email,
                first_name: self.first_name,
                last_name: self.last_name,
                password_hash: self.password_hash,
                created_at: self.created_at,
            }
        }
    }

    #[derive(FromRow)]
    pub(crate) struct DbPgHotel {
        pub id: Uuid,
        pub owner_id: Uuid,
        pub name: String,
        pub city: String,
        pub country: String,
        pub description: String,
        pub hotel_type: String,
        pub adult_count: i64,
        pub child_count: i64,
        pub facilities: Json<Vec<String>>,
        pub price_per_night: i64,
        pub star_rating: i64,
        pub image_urls: Json<Vec<String>>,
        pub last_updated: DateTime<Utc>,
    }

    impl DbPgHotel {
        pub(crate) fn into_domain(self) -> Result<Hotel, RepoError> {
            Ok(Hotel {
                id: HotelId::from_uuid(self.id),
                owner_id: UserId::from_uuid(self.owner_id),
                name: self.name,
                city: self.city,
                country: self.country,
                description: self.description,
                hotel_type: self.hotel_type,
                adult_count: to_u32("adult_count", self.adult_count)?,
                child_count: to_u32("child_count", self.child_count)?,
                facilities: self.facilities.0,
                price_per_night: self.price_per_night,
                star_rating: to_u8("star_rating", self.star_rating)?,
                image_urls: self.image_urls.0,
                last_updated: self.last_updated,
                bookings: Vec::new(),
            })
        }
    }

    #[derive(FromRow)]
    pub(crate) struct DbPgBooking {
        pub id: Uuid,
        pub hotel_id: Uuid,
        pub user_id: Uuid,
        pub first_name: String,
        pub last_name: String,
        pub email: String,
        pub adult_count: i64,
        pub child_count: i64,
        pub check_in: DateTime<Utc>,
        pub check_out: DateTime<Utc>,
        pub total_cost: i64,
        pub payment_intent_id: String,
        pub created_at: DateTime<Utc>,
    }

    impl DbPgBooking {
        pub(crate) fn into_domain(self) -> Result<Booking, RepoError> {
            Ok(Booking {
                id: BookingId::from_uuid(self.id),
                hotel_id: HotelId::from_uuid(self.hotel_id),
                user_id: UserId::from_uuid(self.user_id),
                first_name: self.first_name,
                last_name: self.last_name,
                email: self.email,
                adult_count: to_u32("adult_count", self.adult_count)?,
                child_count: to_u32("child_count", self.child_count)?,
                check_in: self.check_in,
                check_out: self.check_out,
                total_cost: self.total_cost,
                payment_intent_id: self.payment_intent_id,
                created_at: self.created_at,
            })
        }
    }
}

/// Columns selected for a booking row.
pub(crate) const BOOKING_COLUMNS: &str = "id, hotel_id, user_id, first_name, last_name, email, \
     adult_count, child_count, check_in, check_out, total_cost, payment_intent_id, created_at";

/// Columns selected for a user row.
pub(crate) const USER_COLUMNS: &str =
    "id, email, first_name, last_name, password_hash, created_at";
