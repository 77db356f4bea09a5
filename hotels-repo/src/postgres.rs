//! PostgreSQL repository adapter.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use hotels_types::{
    Booking, Hotel, HotelId, HotelRepository, HotelSearch, NewUser, RepoError, SearchPage, User,
    UserId,
};

use crate::search::{self, Dialect, HOTEL_COLUMNS};
use crate::types::pg_rows::{DbPgBooking, DbPgHotel, DbPgUser};
use crate::types::{BOOKING_COLUMNS, USER_COLUMNS, attach_bookings, db_err, write_err};

// ─────────────────────────────────────────────────────────────────────────────
// PostgreSQL Repository
// ─────────────────────────────────────────────────────────────────────────────

/// PostgreSQL repository.
pub struct PostgresRepo {
    pool: PgPool,
}

/// Executes SQL statements from a migration file, splitting by semicolons.
async fn execute_migration(pool: &PgPool, sql: &str, name: &str) -> Result<(), anyhow::Error> {
    for statement in sql.split(';') {
        let stmt = statement.trim();
        if !stmt.is_empty() {
            sqlx::query(stmt)
                .execute(pool)
                .await
                .map_err(|e| anyhow::anyhow!("Migration {} failed: {}", name, e))?;
        }
    }
    Ok(())
}

/// Runs all database migrations.
async fn run_migrations(pool: &PgPool) -> Result<(), anyhow::Error> {
    execute_migration(
        pool,
        include_str!("../migrations/0001_create_users_pg.sql"),
        "0001",
    )
    .await?;

    execute_migration(
        pool,
        include_str!("../migrations/0002_create_hotels_pg.sql"),
        "0002",
    )
    .await?;

    execute_migration(
        pool,
        include_str!("../migrations/0003_create_bookings_pg.sql"),
        "0003",
    )
    .await?;

    Ok(())
}

impl PostgresRepo {
    /// Creates a new PostgreSQL repository with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        run_migrations(&pool).await?;
        tracing::debug!("PostgreSQL repository ready");
        Ok(Self { pool })
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_hotels(&self, sql: &str, bind: Option<Uuid>) -> Result<Vec<Hotel>, RepoError> {
        let mut query = sqlx::query_as::<_, DbPgHotel>(sql);
        if let Some(value) = bind {
            query = query.bind(value);
        }
        let rows = query.fetch_all(&self.pool).await.map_err(db_err)?;
        rows.into_iter().map(DbPgHotel::into_domain).collect()
    }

    async fn with_bookings(
        &self,
        hotels: Vec<Hotel>,
        user: Option<UserId>,
    ) -> Result<Vec<Hotel>, RepoError> {
        if hotels.is_empty() {
            return Ok(hotels);
        }

        let ids: Vec<Uuid> = hotels.iter().map(|h| h.id.into_uuid()).collect();
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "SELECT {} FROM bookings WHERE hotel_id = ANY(",
            BOOKING_COLUMNS
        ));
        qb.push_bind(ids);
        qb.push(")");
        if let Some(user) = user {
            qb.push(" AND user_id = ");
            qb.push_bind(user.into_uuid());
        }
        qb.push(" ORDER BY created_at, id");

        let rows: Vec<DbPgBooking> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        let bookings = rows
            .into_iter()
            .map(DbPgBooking::into_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(attach_bookings(hotels, bookings))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Repository implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl HotelRepository for PostgresRepo {
    async fn create_user(&self, user: NewUser) -> Result<User, RepoError> {
        let id = UserId::new();

        let row: DbPgUser = sqlx::query_as(&format!(
            r#"INSERT INTO users (id, email, first_name, last_name, password_hash)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {}"#,
            USER_COLUMNS
        ))
        .bind(id.into_uuid())
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_err(e, "User already exists"))?;

        Ok(row.into_domain())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let row: Option<DbPgUser> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS))
                .bind(email.trim().to_lowercase())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        Ok(row.map(DbPgUser::into_domain))
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, RepoError> {
        let row: Option<DbPgUser> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS))
                .bind(id.into_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        Ok(row.map(DbPgUser::into_domain))
    }

    async fn create_hotel(&self, hotel: Hotel) -> Result<Hotel, RepoError> {
        sqlx::query(
            r#"INSERT INTO hotels (id, owner_id, name, city, country, description, hotel_type,
                   adult_count, child_count, facilities, price_per_night, star_rating, image_urls, last_updated)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"#,
        )
        .bind(hotel.id.into_uuid())
        .bind(hotel.owner_id.into_uuid())
        .bind(&hotel.name)
        .bind(&hotel.city)
        .bind(&hotel.country)
        .bind(&hotel.description)
        .bind(&hotel.hotel_type)
        .bind(i64::from(hotel.adult_count))
        .bind(i64::from(hotel.child_count))
        .bind(Json(&hotel.facilities))
        .bind(hotel.price_per_night)
        .bind(i64::from(hotel.star_rating))
        .bind(Json(&hotel.image_urls))
        .bind(hotel.last_updated)
        .execute(&self.pool)
        .await
        .map_err(|e| write_err(e, "Hotel already exists"))?;

        tracing::debug!(hotel_id = %hotel.id, "Hotel created");
        Ok(hotel)
    }

    async fn get_hotel(&self, id: HotelId) -> Result<Option<Hotel>, RepoError> {
        let row: Option<DbPgHotel> =
            sqlx::query_as(&format!("SELECT {} FROM hotels WHERE id = $1", HOTEL_COLUMNS))
                .bind(id.into_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err)?;

        let Some(hotel) = row.map(DbPgHotel::into_domain).transpose()? else {
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
                    "SELECT {} FROM hotels WHERE owner_id = $1 ORDER BY last_updated DESC, id",
                    HOTEL_COLUMNS
                ),
                Some(owner.into_uuid()),
            )
            .await?;
        self.with_bookings(hotels, None).await
    }

    async fn search_hotels(&self, search: &HotelSearch) -> Result<SearchPage, RepoError> {
        let mut count = search::count_query::<Postgres>(search, Dialect::Postgres);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut page = search::page_query::<Postgres>(search, Dialect::Postgres);
        let rows: Vec<DbPgHotel> = page
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        let hotels = rows
            .into_iter()
            .map(DbPgHotel::into_domain)
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

        // Lock the hotel row so it cannot disappear under the insert
        let exists: Option<i32> = sqlx::query_scalar("SELECT 1 FROM hotels WHERE id = $1 FOR SHARE")
            .bind(booking.hotel_id.into_uuid())
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err)?;
        if exists.is_none() {
            return Err(RepoError::NotFound);
        }

        sqlx::query(
            r#"INSERT INTO bookings (id, hotel_id, user_id, first_name, last_name, email, adult_count,
                   child_count, check_in, check_out, total_cost, payment_intent_id, created_at)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"#,
        )
        .bind(booking.id.into_uuid())
        .bind(booking.hotel_id.into_uuid())
        .bind(booking.user_id.into_uuid())
        .bind(&booking.first_name)
        .bind(&booking.last_name)
        .bind(&booking.email)
        .bind(i64::from(booking.adult_count))
        .bind(i64::from(booking.child_count))
        .bind(booking.check_in)
        .bind(booking.check_out)
        .bind(booking.total_cost)
        .bind(&booking.payment_intent_id)
        .bind(booking.created_at)
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
                    "SELECT {} FROM hotels WHERE id IN (SELECT hotel_id FROM bookings WHERE user_id = $1) \
                     ORDER BY last_updated DESC, id",
                    HOTEL_COLUMNS
                ),
                Some(user.into_uuid()),
            )
            .await?;
        self.with_bookings(hotels, Some(user)).await
    }
}
