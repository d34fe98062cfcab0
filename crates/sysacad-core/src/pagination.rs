//! Page-number pagination.
//!
//! Collections in this service are small and served from a cached snapshot, so
//! pages are cut from an in-memory `Vec` rather than with `LIMIT/OFFSET`.
//!
//! ```ignore
//! // GET /api/students?page=2&limit=20
//! let page = Paginated::from_vec(students, &params);
//! ```

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Query strings arrive as text; empty values mean "not provided".
fn deserialize_optional_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.is_empty() => Ok(None),
        Some(s) => s.parse::<i64>().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PaginationMeta {
    /// Total number of items across all pages
    pub total: i64,
    /// Items per page
    pub limit: i64,
    /// Current page (1-indexed)
    pub page: i64,
    pub total_pages: i64,
    pub has_more: bool,
}

/// Query parameters for page-number pagination.
///
/// `limit` is clamped to [1, 100] (default 10) and `page` to a minimum of 1.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct PaginationParams {
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub page: Option<i64>,
    /// Items per page (1-100, default: 10)
    #[serde(default, deserialize_with = "deserialize_optional_i64")]
    pub limit: Option<i64>,
}

impl PaginationParams {
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).clamp(1, 100)
    }

    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Saturates instead of overflowing for absurd page numbers.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1).saturating_mul(self.limit())
    }
}

/// A page of items plus its metadata.
#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

impl<T> Paginated<T> {
    /// Cuts the requested page out of a full collection.
    pub fn from_vec(items: Vec<T>, params: &PaginationParams) -> Self {
        let total = items.len() as i64;
        let limit = params.limit();
        let page = params.page();
        let offset = params.offset();

        let data: Vec<T> = items
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();

        let total_pages = if total == 0 {
            0
        } else {
            (total + limit - 1) / limit
        };

        Self {
            data,
            meta: PaginationMeta {
                total,
                limit,
                page,
                total_pages,
                has_more: offset.saturating_add(limit) < total,
            },
        }
    }
}
