use axum::extract::State;
use axum::http::StatusCode;
use sqlx::PgPool;
use tracing::{error, instrument};
use validator::Validate;

use crate::database::is_foreign_key_violation;
use crate::dtos::item::{normalize_price, CreateItemRequest, UpdateItemRequest};
use crate::dtos::response::{offset, ApiResponse, PageQuery, PaginatedResponse, Pagination};
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::item::Item;
use crate::repository::item::ItemRepository;
use crate::state::AppState;

const ITEM_RETURNING: &str =
    "RETURNING id, sku, name, category_id, rack_id, stock, minimum_stock, price, created_at, updated_at";

/// Unique and foreign-key violations on item writes: duplicate sku or unknown category/rack.
fn map_item_write_error(err: sqlx::Error) -> AppError {
    if is_foreign_key_violation(&err) {
        return AppError::invalid_input("category or rack does not exist");
    }
    AppError::on_unique(err, "SKU already exists")
}

async fn find_item(pool: &PgPool, id: i64) -> Result<Item, AppError> {
    ItemRepository::new(pool.clone())
        .find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("item not found"))
}

// GET /items
#[instrument(skip(state))]
pub async fn list_items(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<Item>>, AppError> {
    let (page, limit) = query.resolve(state.config.page_limit);
    let (items, total) = ItemRepository::new(state.db_pool)
        .find_all(limit, offset(page, limit))
        .await
        .map_err(|e| {
            error!(?e, "Failed to fetch items");
            AppError::from(e)
        })?;

    Ok(Json(PaginatedResponse::new(
        "items retrieved successfully",
        items,
        Pagination::new(page, limit, total),
    )))
}

// GET /items/low-stock
#[instrument(skip(state))]
pub async fn list_low_stock_items(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<Item>>, AppError> {
    let (page, limit) = query.resolve(state.config.page_limit);
    let (items, total) = ItemRepository::new(state.db_pool)
        .find_low_stock(limit, offset(page, limit))
        .await?;

    Ok(Json(PaginatedResponse::new(
        "low stock items retrieved successfully",
        items,
        Pagination::new(page, limit, total),
    )))
}

// GET /items/{id}
#[instrument(skip(state))]
pub async fn get_item(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Item>>, AppError> {
    let item = find_item(&state.db_pool, id).await?;
    Ok(Json(ApiResponse::new("item retrieved successfully", item)))
}

// POST /items
#[instrument(skip(state, payload))]
pub async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<CreateItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Item>>), AppError> {
    payload.validate()?;
    let price = normalize_price(payload.price)?;

    let items = ItemRepository::new(state.db_pool.clone());
    if items.find_by_sku(&state.db_pool, payload.sku.trim()).await?.is_some() {
        return Err(AppError::conflict("SKU already exists"));
    }

    let item = sqlx::query_as::<_, Item>(&format!(
        "INSERT INTO items (sku, name, category_id, rack_id, stock, minimum_stock, price)
         VALUES ($1, $2, $3, $4, $5, $6, $7) {ITEM_RETURNING}"
    ))
    .bind(payload.sku.trim())
    .bind(payload.name.trim())
    .bind(payload.category_id)
    .bind(payload.rack_id)
    .bind(payload.stock)
    .bind(payload.minimum_stock)
    .bind(price)
    .fetch_one(&state.db_pool)
    .await
    .map_err(map_item_write_error)?;

    Ok((StatusCode::CREATED, Json(ApiResponse::new("item created successfully", item))))
}

// PUT /items/{id}
#[instrument(skip(state, payload))]
pub async fn update_item(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateItemRequest>,
) -> Result<Json<ApiResponse<Item>>, AppError> {
    payload.validate()?;
    let price = payload.price.map(normalize_price).transpose()?;

    let item = sqlx::query_as::<_, Item>(&format!(
        "UPDATE items SET
            sku = COALESCE($1, sku),
            name = COALESCE($2, name),
            category_id = COALESCE($3, category_id),
            rack_id = COALESCE($4, rack_id),
            minimum_stock = COALESCE($5, minimum_stock),
            price = COALESCE($6, price),
            updated_at = NOW()
         WHERE id = $7 {ITEM_RETURNING}"
    ))
    .bind(payload.sku.as_deref().map(str::trim))
    .bind(payload.name.as_deref().map(str::trim))
    .bind(payload.category_id)
    .bind(payload.rack_id)
    .bind(payload.minimum_stock)
    .bind(price)
    .bind(id)
    .fetch_optional(&state.db_pool)
    .await
    .map_err(map_item_write_error)?
    .ok_or_else(|| AppError::not_found("item not found"))?;

    Ok(Json(ApiResponse::new("item updated successfully", item)))
}

// DELETE /items/{id}
#[instrument(skip(state))]
pub async fn delete_item(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let result = sqlx::query("DELETE FROM items WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await
        .map_err(|e| AppError::on_foreign_key(e, "item is referenced by sales and cannot be deleted"))?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("item not found"));
    }

    Ok(Json(ApiResponse::message("item deleted successfully")))
}
