//! SQLite repository adapter.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use std::str::FromStr;

use hotels_types::{
    Booking, Hotel, HotelId, HotelRepository, HotelSearch, NewUser, RepoError, SearchPage, User,
    UserId,
};

use crate::search::{self, Dialect, HOTEL_COLUMNS};
use crate::types::sqlite_rows::{DbSqliteBooking, DbSqliteHotel, DbSqliteUser, encode_list, ts};
use crate::types::{BOOKING_COLUMNS, USER_COLUMNS, attach_bookings, db_err, write_err};

const MIGRATIONS: [(&str, &str); 3] = [
    ("0001", include_str!("../migrations/0001_create_users.sql")),
    ("0002", include_str!("../migrations/0002_create_hotels.sql")),
    ("0003", include_str!("../migrations/0003_create_bookings.sql")),
];

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Repository
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite repository implementation.
pub struct SqliteRepo {
    pool: SqlitePool,
}

impl SqliteRepo {
    /// Creates a new SQLite repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

        // Ensure on-disk SQLite target directory exists
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            let path = path.split('?').next().unwrap_or(path);
            if !in_memory {
                if let Some(parent) = std::path::Path::new(path).parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every in-memory connection is its own database, so keep exactly one alive.
        let pool = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().connect_with(options).await?
        };

        for (name, sql) in MIGRATIONS {
            for statement in sql.split(';').map(str::trim).filter(|s| !s.is_empty()) {
                sqlx::query(statement)
                    .execute(&pool)
                    .await
                    .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
            }
        }

        tracing::debug!("SQLite repository ready");
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn fetch_hotels(&self, sql: &str, bind: Option<String>) -> Result<Vec<Hotel>, RepoError> {
        let mut query = sqlx::query_as::<_, DbSqliteHotel>(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(db_err)?;
        rows.into_iter().map(DbSqliteHotel::into_domain).collect()
    }

    /// Loads bookings for `hotels`, optionally only those made by `user`.
    async fn with_bookings(
        &self,
        hotels: Vec<Hotel>,
        user: Option<UserId>,
    ) -> Result<Vec<Hotel>, RepoError> {
        if hotels.is_empty() {
            return Ok(hotels);
        }

        let mut qb: QueryBuilder<'_, Sqlite> =
            QueryBuilder::new(format!("SELECT {} FROM bookings WHERE hotel_id IN (", BOOKING_COLUMNS));
        let mut ids = qb.separated(", ");
        for hotel in &hotels {
            ids.push_bind(hotel.id.to_string());
        }
        ids.push_unseparated(")");
        if let Some(user) = user {
            qb.push(" AND user_id = ");
            qb.push_bind(user.to_string());
        }
        qb.push(" ORDER BY created_at, id");

        let rows: Vec<DbSqliteBooking> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        let bookings = rows
            .into_iter()
            .map(DbSqliteBooking::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(attach_bookings(hotels, bookings))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl HotelRepository for SqliteRepo {
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        let id = UserId::new();
        let now = chrono::Utc::now();

        sqlx::query(
            r#"INSERT INTO users (id, email, first_name, last_name, password_hash, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(ts(&now))
        .execute(&self.pool)
        .await
        .map_err(|e| write_err(e, "User already exists"))?;

        Ok(user.into_user(id, now))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let row: Option<DbSqliteUser> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS))
                .bind(email.trim().to_lowercase())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        row.map(DbSqliteUser::into_domain).transpose()
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepoError> {
        let row: Option<DbSqliteUser> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        row.map(DbSqliteUser::into_domain).transpose()
    }

    async fn create_hotel(&self, hotel: Hotel) -> Result<Hotel, RepoError> {
        sqlx::query(
            r#"INSERT INTO hotels (id, owner_id, name, city, country, description, hotel_type,
                   adult_count, child_count, facilities, price_per_night, star_rating, image_urls, last_updated)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(hotel.id.to_string())
        .bind(hotel.owner_id.to_string())
        .bind(&hotel.name)
        .bind(&hotel.city)
        .bind(&hotel.country)
        .bind(&hotel.description)
        .bind(&hotel.hotel_type)
        .bind(i64::from(hotel.adult_count))
        .bind(i64::from(hotel.child_count))
        .bind(encode_list(&hotel.facilities)?)
        .bind(hotel.price_per_night)
        .bind(i64::from(hotel.star_rating))
        .bind(encode_list(&hotel.image_urls)?)
        .bind(ts(&hotel.last_updated))
        .execute(&self.pool)
        .await
        .map_err(|e| write_err(e, "Hotel already exists"))?;

        tracing::debug!(hotel_id = %hotel.id, "Hotel created");
        Ok(hotel)
    }

    async fn get_hotel(&self, id: HotelId) -> Result<Option<Hotel>, RepoError> {
        let row: Option<DbSqliteHotel> =
            sqlx::query_as(&format!("SELECT {} FROM hotels WHERE id = ?", HOTEL_COLUMNS))
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        let Some(hotel) = row.map(DbSqliteHotel::into_domain).transpose()? else {
            return Ok(None);
        };
        Ok(self.with_bookings(vec![hotel], None).await?.pop())
    }

    async fn list_hotels(&self) -> Result<Vec<Hotel>, RepoError> {
        let hotels = self
            .fetch_hotels(
                &format!(
                    "SELECT {} FROM hotels ORDER BY last_updated DESC, id",
                    HOTEL_COLUMNS
                ),
                None,
            )
            .await?;
        self.with_bookings(hotels, None).await
    }

    async fn list_hotels_by_owner(&self, owner: UserId) -> Result<Vec<Hotel>, RepoError> {
        let hotels = self
            .fetch_hotels(
                &format!(
                    "SELECT {} FROM hotels WHERE owner_id = ? ORDER BY last_updated DESC, id",
                    HOTEL_COLUMNS
                ),
                Some(owner.to_string()),
            )
            .await?;
        self.with_bookings(hotels, None).await
    }

    async fn search_hotels(&self, search: &HotelSearch) -> Result<SearchPage, RepoError> {
        let mut count = search::count_query::<Sqlite>(search, Dialect::Sqlite);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut page = search::page_query::<Sqlite>(search, Dialect::Sqlite);
        let rows: Vec<DbSqliteHotel> = page
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        let hotels = rows
            .into_iter()
            .map(DbSqliteHotel::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SearchPage {
            hotels: self.with_bookings(hotels, None).await?,
            total: total.max(0) as u64,
        })
    }

    async fn add_booking(&self, booking: Booking) -> Result<Booking, RepoError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM hotels WHERE id = ?")
            .bind(booking.hotel_id.to_string())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;
        if exists.is_none() {
            return Err(RepoError::NotFound);
        }

        sqlx::query(
            r#"INSERT INTO bookings (id, hotel_id, user_id, first_name, last_name, email, adult_count,
                   child_count, check_in, check_out, total_cost, payment_intent_id, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(booking.id.to_string())
        .bind(booking.hotel_id.to_string())
        .bind(booking.user_id.to_string())
        .bind(&booking.first_name)
        .bind(&booking.last_name)
        .bind(&booking.email)
        .bind(i64::from(booking.adult_count))
        .bind(i64::from(booking.child_count))
        .bind(ts(&booking.check_in))
        .bind(ts(&booking.check_out))
        .bind(booking.total_cost)
        .bind(&booking.payment_intent_id)
        .bind(ts(&booking.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| write_err(e, "Payment intent has already been used for a booking"))?;

        tx.commit()
            .await
            .map_err(|e| RepoError::Transaction(e.to_string()))?;

        tracing::debug!(booking_id = %booking.id, hotel_id = %booking.hotel_id, "Booking stored");
        Ok(booking)
    }

    async fn list_hotels_booked_by(&self, user: UserId) -> Result<Vec<Hotel>, RepoError> {
        let hotels = self
            .fetch_hotels(
                &format!(
                    "SELECT {} FROM hotels WHERE id IN (SELECT hotel_id FROM bookings WHERE user_id = ?) \
                     ORDER BY last_updated DESC, id",
                    HOTEL_COLUMNS
                ),
                Some(user.to_string()),
            )
            .await?;
        self.with_bookings(hotels, Some(user)).await
    }
}
