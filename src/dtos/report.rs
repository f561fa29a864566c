use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct ReportSummaryResponse {
    pub total_items: i64,
    pub low_stock_items: i64,
    pub total_sales: i64,
    pub total_revenue: Decimal,
    pub active_users: i64,
    pub total_categories: i64,
    pub total_warehouses: i64,
}
