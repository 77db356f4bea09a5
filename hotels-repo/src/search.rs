//! SQL construction for hotel search, shared by both adapters.

use sqlx::{Database, Encode, QueryBuilder, Type};

use hotels_types::{HotelSearch, SortOption};

/// Columns selected for a hotel row, in `Db*Hotel` field order.
pub(crate) const HOTEL_COLUMNS: &str = "id, owner_id, name, city, country, description, hotel_type, \
     adult_count, child_count, facilities, price_per_night, star_rating, image_urls, last_updated";

/// Where the two backends disagree: JSON array membership and case folding.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Dialect {
    #[cfg_attr(not(feature = "sqlite"), allow(dead_code))]
    Sqlite,
    #[cfg_attr(not(feature = "postgres"), allow(dead_code))]
    Postgres,
}

impl Dialect {
    /// Lowercases a search term the same way the backend's `LOWER()` does.
    ///
    /// SQLite's built-in `LOWER()` only folds ASCII, so non-ASCII letters are
    /// left as typed there.
    fn fold_case(self, term: &str) -> String {
        match self {
            Dialect::Sqlite => term.to_ascii_lowercase(),
            Dialect::Postgres => term.to_lowercase(),
        }
    }

    fn push_has_facility<'args, DB>(self, qb: &mut QueryBuilder<'args, DB>, facility: String)
    where
        DB: Database,
        String: Encode<'args, DB> + Type<DB>,
    {
        match self {
            Dialect::Sqlite => {
                qb.push(
                    " AND EXISTS (SELECT 1 FROM json_each(hotels.facilities) WHERE json_each.value = ",
                );
                qb.push_bind(facility);
                qb.push(")");
            }
            Dialect::Postgres => {
                qb.push(" AND hotels.facilities @> jsonb_build_array(");
                qb.push_bind(facility);
                qb.push("::text)");
            }
        }
    }
}

/// Escapes `LIKE` metacharacters so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Appends the `WHERE` clause for `search`.
pub(crate) fn push_filters<'args, DB>(
    qb: &mut QueryBuilder<'args, DB>,
    search: &HotelSearch,
    dialect: Dialect,
) where
    DB: Database,
    String: Encode<'args, DB> + Type<DB>,
    i64: Encode<'args, DB> + Type<DB>,
{
    qb.push(" WHERE 1 = 1");

    if let Some(destination) = &search.destination {
        let pattern = format!("%{}%", escape_like(&dialect.fold_case(destination)));
        qb.push(" AND (LOWER(hotels.city) LIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" ESCAPE '\\' OR LOWER(hotels.country) LIKE ");
        qb.push_bind(pattern);
        qb.push(" ESCAPE '\\')");
    }

    if let Some(adults) = search.adult_count {
        qb.push(" AND hotels.adult_count >= ");
        qb.push_bind(i64::from(adults));
    }

    if let Some(children) = search.child_count {
        qb.push(" AND hotels.child_count >= ");
        qb.push_bind(i64::from(children));
    }

    for facility in &search.facilities {
        dialect.push_has_facility(qb, facility.clone());
    }

    if !search.types.is_empty() {
        qb.push(" AND hotels.hotel_type IN (");
        let mut list = qb.separated(", ");
        for hotel_type in &search.types {
            list.push_bind(hotel_type.clone());
        }
        list.push_unseparated(")");
    }

    if !search.stars.is_empty() {
        qb.push(" AND hotels.star_rating IN (");
        let mut list = qb.separated(", ");
        for star in &search.stars {
            list.push_bind(i64::from(*star));
        }
        list.push_unseparated(")");
    }

    if let Some(max_price) = search.max_price {
        qb.push(" AND hotels.price_per_night <= ");
        qb.push_bind(max_price);
    }
}

/// `ORDER BY` clause; `id` breaks ties so pages never overlap.
pub(crate) fn order_by(sort: Option<SortOption>) -> &'static str {
    match sort {
        Some(SortOption::StarRating) => {
            " ORDER BY hotels.star_rating DESC, hotels.last_updated DESC, hotels.id"
        }
        Some(SortOption::PricePerNightAsc) => " ORDER BY hotels.price_per_night ASC, hotels.id",
        Some(SortOption::PricePerNightDesc) => " ORDER BY hotels.price_per_night DESC, hotels.id",
        None => " ORDER BY hotels.last_updated DESC, hotels.id",
    }
}

/// Builds `SELECT COUNT(*)` over the filtered set.
pub(crate) fn count_query<'args, DB>(search: &HotelSearch, dialect: Dialect) -> QueryBuilder<'args, DB>
where
    DB: Database,
    String: Encode<'args, DB> + Type<DB>,
    i64: Encode<'args, DB> + Type<DB>,
{
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM hotels");
    push_filters(&mut qb, search, dialect);
    qb
}

/// Builds the paged `SELECT` over the filtered, ordered set.
pub(crate) fn page_query<'args, DB>(search: &HotelSearch, dialect: Dialect) -> QueryBuilder<'args, DB>
where
    DB: Database,
    String: Encode<'args, DB> + Type<DB>,
    i64: Encode<'args, DB> + Type<DB>,
{
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM hotels", HOTEL_COLUMNS));
    push_filters(&mut qb, search, dialect);
    qb.push(order_by(search.sort));
    qb.push(" LIMIT ");
    qb.push_bind(i64::from(search.page_size));
    qb.push(" OFFSET ");
    qb.push_bind(search.offset() as i64);
    qb
}
