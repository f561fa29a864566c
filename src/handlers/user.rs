use axum::extract::State;
use axum::http::StatusCode;
use sqlx::PgPool;
use tracing::{info, instrument};
use validator::Validate;

use crate::auth::password::hash_password;
use crate::database::is_foreign_key_violation;
use crate::dtos::response::{offset, ApiResponse, PageQuery, PaginatedResponse, Pagination};
use crate::dtos::user::{CreateUserRequest, UpdateUserRequest, UserResponse};
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::models::user::User;
use crate::state::AppState;

pub const USER_SELECT: &str = "SELECT u.id, u.name, u.email, u.password_hash, u.role_id, r.name AS role_name,
        u.is_active, u.created_at, u.updated_at
     FROM users u JOIN roles r ON r.id = u.role_id";

pub async fn find_user(pool: &PgPool, id: i64) -> Result<User, AppError> {
    sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE u.id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::not_found("user not found"))
}

fn map_user_write_error(err: sqlx::Error) -> AppError {
    if is_foreign_key_violation(&err) {
        return AppError::invalid_input("role does not exist");
    }
    AppError::on_unique(err, "email already exists")
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PaginatedResponse<UserResponse>>, AppError> {
    let (page, limit) = query.resolve(state.config.page_limit);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&state.db_pool)
        .await?;

    let users = sqlx::query_as::<_, User>(&format!("{USER_SELECT} ORDER BY u.name ASC, u.id ASC LIMIT $1 OFFSET $2"))
        .bind(limit)
        .bind(offset(page, limit))
        .fetch_all(&state.db_pool)
        .await?;

    Ok(Json(PaginatedResponse::new(
        "users retrieved successfully",
        users.into_iter().map(UserResponse::from).collect(),
        Pagination::new(page, limit, total),
    )))
}

#[instrument(skip(state))]
pub async fn get_user(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = find_user(&state.db_pool, id).await?;
    Ok(Json(ApiResponse::new("user retrieved successfully", UserResponse::from(user))))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserResponse>>), AppError> {
    payload.validate()?;
    let password_hash = hash_password(&payload.password)?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (name, email, password_hash, role_id, is_active)
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(payload.name.trim())
    .bind(payload.email.trim())
    .bind(password_hash)
    .bind(payload.role_id)
    .bind(payload.is_active)
    .fetch_one(&state.db_pool)
    .await
    .map_err(map_user_write_error)?;

    let user = find_user(&state.db_pool, id).await?;
    info!(user_id = id, "user created");

    Ok((StatusCode::CREATED, Json(ApiResponse::new("user created successfully", UserResponse::from(user)))))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let payload = payload.without_blanks();
    payload.validate()?;

    let password_hash = payload.password.as_deref().map(hash_password).transpose()?;

    let result = sqlx::query(
        "UPDATE users SET
            name = COALESCE($1, name),
            email = COALESCE($2, email),
            password_hash = COALESCE($3, password_hash),
            role_id = COALESCE($4, role_id),
            is_active = COALESCE($5, is_active),
            updated_at = NOW()
         WHERE id = $6",
    )
    .bind(payload.name)
    .bind(payload.email)
    .bind(password_hash)
    .bind(payload.role_id)
    .bind(payload.is_active)
    .bind(id)
    .execute(&state.db_pool)
    .await
    .map_err(map_user_write_error)?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("user not found"));
    }

    let user = find_user(&state.db_pool, id).await?;
    Ok(Json(ApiResponse::new("user updated successfully", UserResponse::from(user))))
}

#[instrument(skip(state))]
pub async fn delete_user(
    Path(id): Path<i64>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(&state.db_pool)
        .await
        .map_err(|e| AppError::on_foreign_key(e, "user has recorded sales and cannot be deleted"))?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("user not found"));
    }

    Ok(Json(ApiResponse::message("user deleted successfully")))
}
