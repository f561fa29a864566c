use axum::extract::State;
use tracing::instrument;

use crate::dtos::report::ReportSummaryResponse;
use crate::dtos::response::ApiResponse;
use crate::error::AppError;
use crate::extract::Json;
use crate::state::AppState;

// GET /reports/summary
#[instrument(skip(state))]
pub async fn get_summary(State(state): State<AppState>) -> Result<Json<ApiResponse<ReportSummaryResponse>>, AppError> {
    let summary = sqlx::query_as::<_, ReportSummaryResponse>(
        r#"SELECT
            (SELECT COUNT(*) FROM items) AS total_items,
            (SELECT COUNT(*) FROM items WHERE stock < minimum_stock) AS low_stock_items,
            (SELECT COUNT(*) FROM sales WHERE deleted_at IS NULL) AS total_sales,
            (SELECT COALESCE(SUM(total_amount), 0) FROM sales WHERE deleted_at IS NULL) AS total_revenue,
            (SELECT COUNT(*) FROM users WHERE is_active) AS active_users,
            (SELECT COUNT(*) FROM categories) AS total_categories,
            (SELECT COUNT(*) FROM warehouses) AS total_warehouses"#,
    )
    .fetch_one(&state.db_pool)
    .await?;

    Ok(Json(ApiResponse::new("report summary retrieved successfully", summary)))
}
