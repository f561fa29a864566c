use axum::extract::State;
use axum::http::StatusCode;
use tracing::instrument;
use validator::Validate;

use crate::dtos::response::{offset, ApiResponse, PageQuery, PaginatedResponse, Pagination};
use crate::dtos::warehouse::{CreateWarehouseRequest, UpdateWarehouseRequest};
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::warehouse::Warehouse;
use crate::state::AppState;

const WAREHOUSE_COLUMNS: &str = "id, name, location, created_at, updated_at";

#[instrument(skip(state))]
pub async fn list_warehouses(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<Warehouse>>, AppError> {
    let (page, limit) = query.resolve(state.config.page_limit);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM warehouses")
        .fetch_one(&state.db_pool)
        .await?;

    let warehouses = sqlx::query_as::<_, Warehouse>(&format!(
        "SELECT {WAREHOUSE_COLUMNS} FROM warehouses ORDER BY name ASC LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset(page, limit))
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(PaginatedResponse::new(
        "warehouses retrieved successfully",
        warehouses,
        Pagination::new(page, limit, total),
    )))
}

#[instrument(skip(state))]
pub async fn get_warehouse(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Warehouse>>, AppError> {
    let warehouse = sqlx::query_as::<_, Warehouse>(&format!("SELECT {WAREHOUSE_COLUMNS} FROM warehouses WHERE id = $1"))
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("warehouse not found"))?;

    Ok(Json(ApiResponse::new("warehouse retrieved successfully", warehouse)))
}

#[instrument(skip(state, payload))]
pub async fn create_warehouse(
    State(state): State<AppState>,
    Json(payload): Json<CreateWarehouseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Warehouse>>), AppError> {
    payload.validate()?;

    let warehouse = sqlx::query_as::<_, Warehouse>(&format!(
        "INSERT INTO warehouses (name, location) VALUES ($1, $2) RETURNING {WAREHOUSE_COLUMNS}"
    ))
    .bind(payload.name.trim())
    .bind(payload.location.trim())
    .fetch_one(&state.db_pool)
    .await
    .map_err(|e| AppError::on_unique(e, "warehouse name already exists"))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new("warehouse created successfully", warehouse))))
}

#[instrument(skip(state, payload))]
pub async fn update_warehouse(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateWarehouseRequest>,
) -> Result<Json<ApiResponse<Warehouse>>, AppError> {
    payload.validate()?;

    let warehouse = sqlx::query_as::<_, Warehouse>(&format!(
        "UPDATE warehouses SET
            name = COALESCE($1, name),
            location = COALESCE($2, location),
            updated_at = NOW()
         WHERE id = $3 RETURNING {WAREHOUSE_COLUMNS}"
    ))
    .bind(payload.name.as_deref().map(str::trim))
    .bind(payload.location.as_deref().map(str::trim))
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await
    .map_err(|e| AppError::on_unique(e, "warehouse name already exists"))?
    .ok_or_else(|| AppError::not_found("warehouse not found"))?;

    Ok(Json(ApiResponse::new("warehouse updated successfully", warehouse)))
}

#[instrument(skip(state))]
pub async fn delete_warehouse(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let result = sqlx::query("DELETE FROM warehouses WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await
        .map_err(|e| AppError::on_foreign_key(e, "warehouse still has racks"))?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("warehouse not found"));
    }

    Ok(Json(ApiResponse::message("warehouse deleted successfully")))
}
