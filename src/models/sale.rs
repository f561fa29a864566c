use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// Sale header. `deleted_at` is the soft-delete marker; read paths only ever return rows where it is `None`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Sale {
    pub id: i64,
    pub user_id: i64,
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub item_id: i64,
    pub quantity: i32,
    pub price_at_sale: Decimal,
    pub subtotal: Decimal,
}

/// A priced line that has not been written yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewSaleItem {
    pub item_id: i64,
    pub quantity: i32,
    pub price_at_sale: Decimal,
    pub subtotal: Decimal,
}
