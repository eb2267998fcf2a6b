//! Pagination types shared by list endpoints

use serde::{Deserialize, Serialize};

/// Default page size for list endpoints
pub const DEFAULT_PER_PAGE: u32 = 20;
/// Upper bound on page size
pub const MAX_PER_PAGE: u32 = 100;

/// Pagination query parameters (`?page=&per_page=`)
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageQuery {
    /// 1-based page number
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    /// SQL `LIMIT`
    pub fn limit(&self) -> i64 {
        self.per_page() as i64
    }

    /// SQL `OFFSET`
    pub fn offset(&self) -> i64 {
        (self.page() as i64 - 1) * self.per_page() as i64
    }
}

/// Pagination metadata
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Pagination {
    /// Current page number (1-based)
    pub page: u32,
    /// Items per page
    pub per_page: u32,
    /// Total number of items
    pub total: u64,
    /// Total number of pages
    pub total_pages: u32,
}

impl Pagination {
    pub fn new(page: u32, per_page: u32, total: u64) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(per_page as u64) as u32
        };
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, query: &PageQuery, total: i64) -> Self {
        Self {
            items,
            pagination: Pagination::new(query.page(), query.per_page(), total.max(0) as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_query_defaults_and_clamps() {
        let q = PageQuery::default();
        assert_eq!(q.page(), 1);
        assert_eq!(q.per_page(), DEFAULT_PER_PAGE);
        assert_eq!(q.offset(), 0);

        let q = PageQuery {
            page: Some(0),
            per_page: Some(500),
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.per_page(), MAX_PER_PAGE);

        let q = PageQuery {
            page: Some(3),
            per_page: Some(10),
        };
        assert_eq!(q.limit(), 10);
        assert_eq!(q.offset(), 20);
    }

    #[test]
    fn pagination_total_pages() {
        assert_eq!(Pagination::new(1, 20, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 20, 20).total_pages, 1);
        assert_eq!(Pagination::new(1, 20, 21).total_pages, 2);
        assert_eq!(Pagination::new(1, 0, 21).total_pages, 0);
    }
}
