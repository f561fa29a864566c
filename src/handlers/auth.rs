use axum::extract::State;
use axum::Extension;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::auth::jwt::sign_token;
use crate::auth::password::verify_password;
use crate::dtos::response::ApiResponse;
use crate::dtos::user::{LoginRequest, LoginResponse, UserResponse};
use crate::error::AppError;
use crate::extract::Json;
use crate::handlers::user::{find_user, USER_SELECT};
use crate::middleware::auth::AuthContext;
use crate::models::user::{Session, User};
use crate::state::AppState;

// POST /login
#[instrument(skip_all)]
pub async fn login(
    State(AppState { db_pool, config }): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, AppError> {
    let email = payload.email.trim();
    if email.is_empty() || payload.password.is_empty() {
        return Err(AppError::invalid_input("email and password are required"));
    }

    let user = sqlx::query_as::<_, User>(&format!("{USER_SELECT} WHERE u.email = $1 AND u.is_active"))
        .bind(email)
        .fetch_optional(&db_pool)
        .await?;

    // Unknown email and wrong password are indistinguishable to the caller.
    let user = match user {
        Some(user) if verify_password(&payload.password, &user.password_hash)? => user,
        _ => {
            warn!("rejected login attempt");
            return Err(AppError::unauthorized("invalid email or password"));
        }
    };

    let issued_at = Utc::now();
    let expires_at = issued_at + Duration::hours(config.session_ttl_hours);
    let session_id = Uuid::new_v4();

    sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
        .bind(session_id)
        .bind(user.id)
        .bind(expires_at)
        .execute(&db_pool)
        .await?;

    let token = sign_token(user.id, session_id, &user.role_name, issued_at, expires_at, &config.jwt_secret)?;
    info!(user_id = user.id, %session_id, "session opened");

    match purge_stale_sessions(&db_pool).await {
        Ok(purged) => debug!(purged, "stale sessions purged"),
        Err(e) => warn!(error = %e, "failed to purge stale sessions"),
    }

    Ok(Json(ApiResponse::new(
        "login successful",
        LoginResponse { token, token_type: "Bearer", expires_at, user: UserResponse::from(user) },
    )))
}

/// Deletes expired and revoked sessions; neither can authenticate again.
pub async fn purge_stale_sessions(pool: &PgPool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at < NOW() OR revoked_at IS NOT NULL")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

// POST /logout
#[instrument(skip(state, auth), fields(user_id = auth.user_id))]
pub async fn logout(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let session = sqlx::query_as::<_, Session>(
        "UPDATE sessions SET revoked_at = NOW() WHERE id = $1 AND revoked_at IS NULL
         RETURNING id, user_id, expires_at, revoked_at, created_at",
    )
    .bind(auth.session_id)
    .fetch_optional(&state.db_pool)
    .await?;

    if let Some(session) = session {
        info!(session_id = %session.id, opened_at = %session.created_at, "session revoked");
    }

    Ok(Json(ApiResponse::message("logout successful")))
}

// GET /me
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ApiResponse<UserResponse>>, AppError> {
    let user = find_user(&state.db_pool, auth.user_id).await?;
    Ok(Json(ApiResponse::new("profile retrieved successfully", UserResponse::from(user))))
}
