//! Offset pagination shared by listing endpoints.

use serde::{Deserialize, Serialize};

const MAX_LIMIT: u64 = 100;
/// Keeps `offset()` within a PostgreSQL `BIGINT`.
const MAX_PAGE: u64 = i64::MAX as u64 / MAX_LIMIT;

/// Order in which a listing is returned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

/// `?page=&limit=&order=` query string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub order: Option<SortOrder>,
}

impl PageQuery {
    /// Resolve into a [`PageRequest`] with endpoint-specific defaults.
    pub fn with_defaults(self, default_limit: u64, default_order: SortOrder) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.limit.unwrap_or(default_limit),
        )
        .order(self.order.unwrap_or(default_order))
    }
}

/// Normalized page request. `page` starts at 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
    pub order: SortOrder,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.clamp(1, MAX_PAGE),
            limit: limit.clamp(1, MAX_LIMIT),
            order: SortOrder::default(),
        }
    }

    pub fn order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.limit
    }
}

/// One page of a listing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, total: u64, request: &PageRequest) -> Self {
        Self {
            data,
            total,
            total_pages: total.div_ceil(request.limit),
            current_page: request.page,
        }
    }

    /// Transform every entry, keeping counters.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            total: self.total,
            total_pages: self.total_pages,
            current_page: self.current_page,
        }
    }
}

/// Slice an in-memory collection the same way the database does.
pub fn slice<T: Clone>(entries: &[T], request: &PageRequest) -> Vec<T> {
    entries
        .iter()
        .skip(request.offset() as usize)
        .take(request.limit as usize)
        .cloned()
        .collect()
}
