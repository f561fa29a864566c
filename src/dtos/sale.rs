use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::sale::{Sale, SaleItem};

#[derive(Debug, Deserialize)]
pub struct SaleRequest {
    #[serde(default)]
    pub items: Vec<SaleLineRequest>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct SaleLineRequest {
    pub item_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct SaleResponse {
    pub id: i64,
    pub user_id: i64,
    pub total_amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<SaleItemResponse>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SaleItemResponse {
    pub id: i64,
    pub item_id: i64,
    pub quantity: i32,
    pub price_at_sale: Decimal,
    pub subtotal: Decimal,
}

impl From<Sale> for SaleResponse {
    fn from(sale: Sale) -> Self {
        Self {
            id: sale.id,
            user_id: sale.user_id,
            total_amount: sale.total_amount,
            items: None,
            created_at: sale.created_at,
            updated_at: sale.updated_at,
        }
    }
}

impl From<SaleItem> for SaleItemResponse {
    fn from(item: SaleItem) -> Self {
        Self {
            id: item.id,
            item_id: item.item_id,
            quantity: item.quantity,
            price_at_sale: item.price_at_sale,
            subtotal: item.subtotal,
        }
    }
}

impl SaleResponse {
    pub fn with_items(sale: Sale, items: Vec<SaleItem>) -> Self {
        let mut response = Self::from(sale);
        response.items = Some(items.into_iter().map(SaleItemResponse::from).collect());
        response
    }
}
