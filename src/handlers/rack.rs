use axum::extract::State;
use axum::http::StatusCode;
use tracing::instrument;
use validator::Validate;

use crate::database::is_foreign_key_violation;
use crate::dtos::rack::{CreateRackRequest, RackListQuery, UpdateRackRequest};
use crate::dtos::response::{offset, ApiResponse, PageQuery, PaginatedResponse, Pagination};
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::rack::Rack;
use crate::state::AppState;

const RACK_COLUMNS: &str = "id, warehouse_id, code, description, created_at, updated_at";

fn map_rack_write_error(err: sqlx::Error) -> AppError {
    if is_foreign_key_violation(&err) {
        return AppError::invalid_input("warehouse does not exist");
    }
    AppError::on_unique(err, "rack code already exists in this warehouse")
}

/// GET /racks?warehouse_id=
#[instrument(skip(state))]
pub async fn list_racks(
    State(state): State<AppState>,
    Query(query): Query<RackListQuery>,
) -> Result<Json<PaginatedResponse<Rack>>, AppError> {
    let (page, limit) = PageQuery { page: query.page, limit: query.limit }.resolve(state.config.page_limit);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM racks WHERE ($1::BIGINT IS NULL OR warehouse_id = $1)")
        .bind(query.warehouse_id)
        .fetch_one(&state.db_pool)
        .await?;

    let racks = sqlx::query_as::<_, Rack>(&format!(
        "SELECT {RACK_COLUMNS} FROM racks
         WHERE ($1::BIGINT IS NULL OR warehouse_id = $1)
         ORDER BY warehouse_id ASC, code ASC LIMIT $2 OFFSET $3"
    ))
    .bind(query.warehouse_id)
    .bind(limit)
    .bind(offset(page, limit))
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(PaginatedResponse::new(
        "racks retrieved successfully",
        racks,
        Pagination::new(page, limit, total),
    )))
}

#[instrument(skip(state))]
pub async fn get_rack(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Rack>>, AppError> {
    let rack = sqlx::query_as::<_, Rack>(&format!("SELECT {RACK_COLUMNS} FROM racks WHERE id = $1"))
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("rack not found"))?;

    Ok(Json(ApiResponse::new("rack retrieved successfully", rack)))
}

#[instrument(skip(state, payload))]
pub async fn create_rack(
    State(state): State<AppState>,
    Json(payload): Json<CreateRackRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Rack>>), AppError> {
    payload.validate()?;

    let rack = sqlx::query_as::<_, Rack>(&format!(
        "INSERT INTO racks (warehouse_id, code, description) VALUES ($1, $2, $3) RETURNING {RACK_COLUMNS}"
    ))
    .bind(payload.warehouse_id)
    .bind(payload.code.trim())
    .bind(payload.description)
    .fetch_one(&state.db_pool)
    .await
    .map_err(map_rack_write_error)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new("rack created successfully", rack))))
}

#[instrument(skip(state, payload))]
pub async fn update_rack(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateRackRequest>,
) -> Result<Json<ApiResponse<Rack>>, AppError> {
    payload.validate()?;

    let rack = sqlx::query_as::<_, Rack>(&format!(
        "UPDATE racks SET
            warehouse_id = COALESCE($1, warehouse_id),
            code = COALESCE($2, code),
            description = COALESCE($3, description),
            updated_at = NOW()
         WHERE id = $4 RETURNING {RACK_COLUMNS}"
    ))
    .bind(payload.warehouse_id)
    .bind(payload.code.as_deref().map(str::trim))
    .bind(payload.description)
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await
    .map_err(map_rack_write_error)?
    .ok_or_else(|| AppError::not_found("rack not found"))?;

    Ok(Json(ApiResponse::new("rack updated successfully", rack)))
}

#[instrument(skip(state))]
pub async fn delete_rack(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let result = sqlx::query("DELETE FROM racks WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await
        .map_err(|e| AppError::on_foreign_key(e, "rack still holds items"))?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("rack not found"));
    }

    Ok(Json(ApiResponse::message("rack deleted successfully")))
}
