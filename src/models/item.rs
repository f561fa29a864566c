use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Item {
    pub id: i64,
    pub sku: String,
    pub name: String,
    pub category_id: i64,
    pub rack_id: i64,
    pub stock: i32,
    pub minimum_stock: i32,
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Label used in error messages, e.g. `'Bolt M6' (id 7)`.
    pub fn label(&self) -> String {
        format!("'{}' (id {})", self.name, self.id)
    }
}
