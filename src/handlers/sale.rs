use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use tracing::instrument;

use crate::dtos::response::{offset, ApiResponse, PageQuery, PaginatedResponse, Pagination};
use crate::dtos::sale::{SaleRequest, SaleResponse};
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::middleware::auth::AuthContext;
use crate::services::sale::SaleService;
use crate::state::AppState;

// POST /sales
#[instrument(skip(state, auth, req), fields(user_id = auth.user_id))]
pub async fn create_sale(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<SaleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SaleResponse>>), AppError> {
    let sale = SaleService::new(state.db_pool).create(auth.user_id, &req.items).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new("sale created successfully", SaleResponse::from(sale))),
    ))
}

// GET /sales
#[instrument(skip(state))]
pub async fn list_sales(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<SaleResponse>>, AppError> {
    let (page, limit) = query.resolve(state.config.page_limit);
    let (sales, total) = SaleService::new(state.db_pool).list(limit, offset(page, limit)).await?;

    Ok(Json(PaginatedResponse::new(
        "sales retrieved successfully",
        sales.into_iter().map(SaleResponse::from).collect(),
        Pagination::new(page, limit, total),
    )))
}

// GET /sales/{id}
#[instrument(skip(state))]
pub async fn get_sale(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<SaleResponse>>, AppError> {
    let (sale, items) = SaleService::new(state.db_pool).get_by_id(id).await?;

    Ok(Json(ApiResponse::new("sale retrieved successfully", SaleResponse::with_items(sale, items))))
}

// PUT /sales/{id}
#[instrument(skip(state, req))]
pub async fn update_sale(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(req): Json<SaleRequest>,
) -> Result<Json<ApiResponse<SaleResponse>>, AppError> {
    let service = SaleService::new(state.db_pool);
    service.update(id, &req.items).await?;
    let (sale, items) = service.get_by_id(id).await?;

    Ok(Json(ApiResponse::new("sale updated successfully", SaleResponse::with_items(sale, items))))
}

// DELETE /sales/{id}
#[instrument(skip(state))]
pub async fn delete_sale(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    SaleService::new(state.db_pool).delete(id).await?;

    Ok(Json(ApiResponse::message("sale deleted successfully")))
}
