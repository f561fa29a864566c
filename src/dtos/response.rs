// src/dtos/response.rs
use serde::{Deserialize, Serialize};

pub const MAX_PAGE_LIMIT: i64 = 100;

/// Success envelope: `{message, data}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self { message: message.into(), data: Some(data) }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self { message: message.into(), data: None }
    }
}

#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub message: String,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T: Serialize> PaginatedResponse<T> {
    pub fn new(message: impl Into<String>, data: Vec<T>, pagination: Pagination) -> Self {
        Self { message: message.into(), data, pagination }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    pub current_page: i64,
    pub limit: i64,
    pub total_pages: i64,
    pub total_records: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total_records: i64) -> Self {
        let total_pages = if limit > 0 { (total_records + limit - 1) / limit } else { 0 };
        Self { current_page: page, limit, total_pages, total_records }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl PageQuery {
    /// Returns `(page, limit)`: page floors at 1, limit falls back to `default_limit` and is clamped to `1..=MAX_PAGE_LIMIT`.
    pub fn resolve(&self, default_limit: i64) -> (i64, i64) {
        let page = self.page.filter(|p| *p >= 1).unwrap_or(1);
        let limit = self.limit.unwrap_or(default_limit).clamp(1, MAX_PAGE_LIMIT);
        (page, limit)
    }
}

pub fn offset(page: i64, limit: i64) -> i64 {
    (page - 1) * limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 10, 10).total_pages, 1);
        assert_eq!(Pagination::new(1, 10, 11).total_pages, 2);
        assert_eq!(Pagination::new(3, 7, 50).total_pages, 8);
    }

    #[test]
    fn page_query_defaults_and_clamps() {
        assert_eq!(PageQuery::default().resolve(10), (1, 10));
        assert_eq!(PageQuery { page: Some(0), limit: Some(500) }.resolve(10), (1, MAX_PAGE_LIMIT));
        assert_eq!(PageQuery { page: Some(-4), limit: Some(0) }.resolve(10), (1, 1));
        assert_eq!(PageQuery { page: Some(3), limit: Some(25) }.resolve(10), (3, 25));
    }

    #[test]
    fn offset_starts_at_zero() {
        assert_eq!(offset(1, 10), 0);
        assert_eq!(offset(4, 25), 75);
    }

    #[test]
    fn message_only_envelope_serializes_null_data() {
        let json = serde_json::to_value(ApiResponse::message("sale deleted successfully")).unwrap();
        assert_eq!(json["message"], "sale deleted successfully");
        assert!(json["data"].is_null());
    }
}
