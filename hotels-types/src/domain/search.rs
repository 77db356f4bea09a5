//! Hotel search criteria.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::hotel::Hotel;
use crate::dto::HotelSearchQuery;
use crate::error::DomainError;

/// Number of hotels returned per search page.
pub const PAGE_SIZE: u32 = 5;

/// Result ordering for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOption {
    /// Highest star rating first
    StarRating,
    PricePerNightAsc,
    PricePerNightDesc,
}

impl SortOption {
    /// Query-string form, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StarRating => "star_rating",
            Self::PricePerNightAsc => "price_per_night_asc",
            Self::PricePerNightDesc => "price_per_night_desc",
        }
    }
}

impl std::str::FromStr for SortOption {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "star_rating" => Ok(Self::StarRating),
            "price_per_night_asc" => Ok(Self::PricePerNightAsc),
            "price_per_night_desc" => Ok(Self::PricePerNightDesc),
            other => Err(DomainError::ValidationError(format!(
                "Unknown sort option: {}",
                other
            ))),
        }
    }
}

/// Normalized search criteria, ready for a repository to evaluate.
///
/// Every populated field narrows the result set; empty lists and `None`
/// mean "no constraint".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotelSearch {
    /// Case-insensitive substring of city or country
    pub destination: Option<String>,
    pub adult_count: Option<u32>,
    pub child_count: Option<u32>,
    /// Hotel must offer every listed facility
    pub facilities: Vec<String>,
    /// Hotel type must be one of these
    pub types: Vec<String>,
    /// Star rating must be one of these
    pub stars: Vec<u8>,
    pub max_price: Option<i64>,
    /// `None` orders by most recently updated
    pub sort: Option<SortOption>,
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
}

impl Default for HotelSearch {
    fn default() -> Self {
        Self {
            destination: None,
            adult_count: None,
            child_count: None,
            facilities: Vec::new(),
            types: Vec::new(),
            stars: Vec::new(),
            max_price: None,
            sort: None,
            page: 1,
            page_size: PAGE_SIZE,
        }
    }
}

fn non_blank(values: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect();
    out.dedup();
    out
}

impl HotelSearch {
    /// Builds criteria from raw query parameters.
    pub fn from_query(query: HotelSearchQuery) -> Result<Self, DomainError> {
        if let Some(star) = query.stars.iter().find(|s| !(1..=5).contains(*s)) {
            return Err(DomainError::ValidationError(format!(
                "stars must be between 1 and 5, got {}",
                star
            )));
        }
        if matches!(query.max_price, Some(p) if p < 0) {
            return Err(DomainError::NegativeAmount);
        }

        let mut stars = query.stars;
        stars.sort_unstable();
        stars.dedup();

        Ok(Self {
            destination: query
                .destination
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            adult_count: query.adult_count,
            child_count: query.child_count,
            facilities: non_blank(query.facilities),
            types: non_blank(query.types),
            stars,
            max_price: query.max_price,
            sort: query.sort_option,
            page: query.page.unwrap_or(1).max(1),
            page_size: PAGE_SIZE,
        })
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    /// Number of pages needed for `total` matches.
    pub fn pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.page_size))
    }
}

/// One page of search results plus the unpaged match count.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub hotels: Vec<Hotel>,
    pub total: u64,
}
