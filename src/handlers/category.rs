use axum::extract::State;
use axum::http::StatusCode;
use tracing::instrument;
use validator::Validate;

use crate::dtos::category::{CreateCategoryRequest, UpdateCategoryRequest};
use crate::dtos::response::{offset, ApiResponse, PageQuery, PaginatedResponse, Pagination};
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::category::Category;
use crate::state::AppState;

const CATEGORY_COLUMNS: &str = "id, name, description, created_at, updated_at";

#[instrument(skip(state))]
pub async fn list_categories(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<Category>>, AppError> {
    let (page, limit) = query.resolve(state.config.page_limit);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(&state.db_pool)
        .await?;

    let categories = sqlx::query_as::<_, Category>(&format!(
        "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name ASC LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset(page, limit))
    .fetch_all(&state.db_pool)
    .await?;

    Ok(Json(PaginatedResponse::new(
        "categories retrieved successfully",
        categories,
        Pagination::new(page, limit, total),
    )))
}

#[instrument(skip(state))]
pub async fn get_category(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Category>>, AppError> {
    let category = sqlx::query_as::<_, Category>(&format!("SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"))
        .bind(id)
        .fetch_optional(&state.db_pool)
        .await?
        .ok_or_else(|| AppError::not_found("category not found"))?;

    Ok(Json(ApiResponse::new("category retrieved successfully", category)))
}

#[instrument(skip(state, payload))]
pub async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>), AppError> {
    payload.validate()?;

    let category = sqlx::query_as::<_, Category>(&format!(
        "INSERT INTO categories (name, description) VALUES ($1, $2) RETURNING {CATEGORY_COLUMNS}"
    ))
    .bind(payload.name.trim())
    .bind(payload.description)
    .fetch_one(&state.db_pool)
    .await
    .map_err(|e| AppError::on_unique(e, "category name already exists"))?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new("category created successfully", category))))
}

#[instrument(skip(state, payload))]
pub async fn update_category(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<ApiResponse<Category>>, AppError> {
    payload.validate()?;

    let category = sqlx::query_as::<_, Category>(&format!(
        "UPDATE categories SET
            name = COALESCE($1, name),
            description = COALESCE($2, description),
            updated_at = NOW()
         WHERE id = $3 RETURNING {CATEGORY_COLUMNS}"
    ))
    .bind(payload.name.as_deref().map(str::trim))
    .bind(payload.description)
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await
    .map_err(|e| AppError::on_unique(e, "category name already exists"))?
    .ok_or_else(|| AppError::not_found("category not found"))?;

    Ok(Json(ApiResponse::new("category updated successfully", category)))
}

#[instrument(skip(state))]
pub async fn delete_category(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let result = sqlx::query("DELETE FROM categories WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await
        .map_err(|e| AppError::on_foreign_key(e, "category still has items"))?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("category not found"));
    }

    Ok(Json(ApiResponse::message("category deleted successfully")))
}
