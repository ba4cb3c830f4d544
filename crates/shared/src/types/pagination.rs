//! API response envelope and pagination types for list endpoints.
//!
//! Every paginated GET returns `{ "data": { "results": [...], "count",
//! "page", "limit", "total_pages" }, "success": true }`; single-object
//! writes return `{ "data": ..., "success": true }`.

use serde::{Deserialize, Serialize};

/// Request parameters for paginated queries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageRequest {
    /// Page number (1-indexed).
    #[serde(default = "default_page")]
    pub page: u32,
    /// Number of items per page.
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    20
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PageRequest {
    /// Calculates the offset for database queries.
    #[must_use]
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }

    /// Returns the limit for database queries.
    #[must_use]
    pub fn db_limit(&self) -> u64 {
        u64::from(self.limit)
    }
}

/// A page of results with pagination metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// The items in the current page.
    pub results: Vec<T>,
    /// Total number of items across all pages.
    pub count: u64,
    /// Current page number.
    pub page: u32,
    /// Items per page.
    pub limit: u32,
    /// Total number of pages.
    pub total_pages: u32,
}

impl<T> Paginated<T> {
    /// Builds a page of results. `total_pages` is `ceil(count / limit)`,
    /// with an empty result set counting as a single page.
    #[must_use]
    pub fn new(results: Vec<T>, page: u32, limit: u32, count: u64) -> Self {
        let total_pages = if count == 0 || limit == 0 {
            1
        } else {
            u32::try_from(count.div_ceil(u64::from(limit))).unwrap_or(u32::MAX)
        };

        Self {
            results,
            count,
            page,
            limit,
            total_pages,
        }
    }
}

/// The uniform success envelope wrapping all API response bodies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// The response payload.
    pub data: T,
    /// Always `true` for successful responses.
    pub success: bool,
}

impl<T> ApiResponse<T> {
    /// Wraps a payload in the success envelope.
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self {
            data,
            success: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_twenty_items_limit_ten_yields_two_pages() {
        let results: Vec<u32> = (0..10).collect();
        let page = Paginated::new(results, 1, 10, 20);

        assert_eq!(page.total_pages, 2);
        assert_eq!(page.results.len(), 10);
        assert_eq!(page.count, 20);
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 10);
    }

    #[rstest]
    #[case(0, 10, 1)] // empty result set still counts as one page
    #[case(21, 10, 3)] // partial last page
    #[case(20, 10, 2)]
    #[case(1, 10, 1)]
    fn test_total_pages(#[case] count: u64, #[case] limit: u32, #[case] expected: u32) {
        let page: Paginated<u32> = Paginated::new(vec![], 1, limit, count);
        assert_eq!(page.total_pages, expected);
    }

    #[test]
    fn test_offset_and_limit() {
        let req = PageRequest { page: 3, limit: 25 };
        assert_eq!(req.offset(), 50);
        assert_eq!(req.db_limit(), 25);

        // Page 0 is clamped to the first page.
        let req = PageRequest { page: 0, limit: 25 };
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn test_envelope_shape() {
        let body = ApiResponse::ok(Paginated::new(vec![1, 2], 1, 10, 2));
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["results"], serde_json::json!([1, 2]));
        assert_eq!(json["data"]["count"], 2);
        assert_eq!(json["data"]["total_pages"], 1);
    }

    proptest! {
        /// total_pages is always the ceiling of count / limit (non-empty case).
        #[test]
        fn prop_total_pages_is_ceiling(count in 1u64..100_000, limit in 1u32..1_000) {
            let page: Paginated<u32> = Paginated::new(vec![], 1, limit, count);
            let expected = count.div_ceil(u64::from(limit));
            prop_assert_eq!(u64::from(page.total_pages), expected);
        }

        /// Every fully-populated page except the last holds exactly `limit` items.
        #[test]
        fn prop_offset_never_overlaps(page in 1u32..1_000, limit in 1u32..1_000) {
            let req = PageRequest { page, limit };
            prop_assert_eq!(req.offset(), u64::from(page - 1) * u64::from(limit));
        }
    }
}
