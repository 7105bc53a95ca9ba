//! Page/limit pagination for listing queries

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Pagination request parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Current page number (1-indexed)
    pub page: u32,
    /// Number of items per page, at most [`MAX_LIMIT`]
    pub limit: u32,
}

impl PageRequest {
    /// Create a page request, clamping page to at least 1 and limit to 1..=100
    ///
    /// # Examples
    ///
    /// ```
    /// use core_catalog::pagination::PageRequest;
    ///
    /// let request = PageRequest::new(3, 20);
    /// assert_eq!(request.skip(), 40);
    ///
    /// let request = PageRequest::new(0, 1000);
    /// assert_eq!(request.page, 1);
    /// assert_eq!(request.limit, 100);
    /// ```
    pub fn new(page: u32, limit: u32) -> Self {
        let limit = if limit == 0 {
            DEFAULT_LIMIT
        } else {
            limit.min(MAX_LIMIT)
        };
        Self {
            page: page.max(1),
            limit,
        }
    }

    /// Build from raw query strings.
    ///
    /// A missing, non-numeric or non-positive limit falls back to the
    /// default; a missing, non-numeric or non-positive page becomes 1.
    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = parse_positive(page).unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive(limit).unwrap_or(DEFAULT_LIMIT);
        Self::new(page, limit)
    }

    /// Number of rows to skip (SQL OFFSET)
    pub fn skip(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

fn parse_positive(value: Option<&str>) -> Option<u32> {
    let parsed = value?.trim().parse::<i64>().ok()?;
    if parsed <= 0 {
        None
    } else {
        Some(u32::try_from(parsed).unwrap_or(u32::MAX))
    }
}

/// Paging metadata as exposed to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    pub pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Paginated response containing items and metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items in the current page
    pub items: Vec<T>,
    /// Total number of matching items across all pages
    pub total: u64,
    pub page: u32,
    pub limit: u32,
    /// Total number of pages
    pub pages: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> Page<T> {
    /// Create a new paginated response
    ///
    /// # Examples
    ///
    /// ```
    /// use core_catalog::pagination::{Page, PageRequest};
    ///
    /// let page = Page::new(vec![1, 2, 3], 25, PageRequest::new(1, 10));
    /// assert_eq!(page.pages, 3);
    /// assert!(page.has_next);
    /// assert!(!page.has_prev);
    /// ```
    pub fn new(items: Vec<T>, total: u64, request: PageRequest) -> Self {
        let pages = if request.limit == 0 {
            0
        } else {
            total.div_ceil(u64::from(request.limit))
        };

        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
            pages,
            has_next: u64::from(request.page) < pages,
            has_prev: request.page > 1,
        }
    }

    pub fn info(&self) -> PageInfo {
        PageInfo {
            total: self.total,
            page: self.page,
            limit: self.limit,
            pages: self.pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }

    /// Map the items to a different type
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            pages: self.pages,
            has_next: self.has_next,
            has_prev: self.has_prev,
        }
    }
}
