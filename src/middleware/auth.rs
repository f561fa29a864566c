use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use http::header::AUTHORIZATION;
use uuid::Uuid;

use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::models::user::is_elevated_role;
use crate::state::AppState;

#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user_id: i64,
    pub session_id: Uuid,
    pub role: String,
    pub name: String,
    pub email: String,
}

impl AuthContext {
    pub fn is_elevated(&self) -> bool {
        is_elevated_role(&self.role)
    }
}

#[derive(sqlx::FromRow)]
struct SessionUserRow {
    user_id: i64,
    session_id: Uuid,
    role: String,
    name: String,
    email: String,
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AppError> {
    let header = header.ok_or_else(|| AppError::unauthorized("missing authorization header"))?;
    match header.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        _ => Err(AppError::unauthorized("invalid authorization header format")),
    }
}

pub async fn require_auth(
    State(AppState { db_pool, config }): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = req.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok());
    let token = bearer_token(header)?;
    let claims = verify_token(token, &config.jwt_secret)?;

    // Signature alone is not enough: the session may have been revoked by logout.
    let row = sqlx::query_as::<_, SessionUserRow>(
        r#"SELECT u.id AS user_id, s.id AS session_id, r.name AS role, u.name, u.email
           FROM sessions s
           JOIN users u ON u.id = s.user_id
           JOIN roles r ON r.id = u.role_id
           WHERE s.id = $1 AND s.user_id = $2
             AND s.revoked_at IS NULL AND s.expires_at > NOW()
             AND u.is_active"#,
    )
    .bind(claims.sid)
    .bind(claims.sub)
    .fetch_optional(&db_pool)
    .await?
    .ok_or_else(|| AppError::unauthorized("invalid or expired token"))?;

    req.extensions_mut().insert(AuthContext {
        user_id: row.user_id,
        session_id: row.session_id,
        role: row.role,
        name: row.name,
        email: row.email,
    });

    Ok(next.run(req).await)
}

/// Must run inside `require_auth`.
pub async fn require_elevated(req: Request, next: Next) -> Result<Response, AppError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .ok_or_else(|| AppError::unauthorized("unauthorized"))?;

    if !auth.is_elevated() {
        return Err(AppError::forbidden("access denied"));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_requires_scheme_and_value() {
        assert_eq!(bearer_token(Some("Bearer abc.def")).unwrap(), "abc.def");
        assert!(matches!(bearer_token(None), Err(AppError::Unauthorized(_))));
        assert!(matches!(bearer_token(Some("Basic abc")), Err(AppError::Unauthorized(_))));
        assert!(matches!(bearer_token(Some("Bearer ")), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn only_admin_roles_are_elevated() {
        let ctx = |role: &str| AuthContext {
            user_id: 1,
            session_id: Uuid::nil(),
            role: role.to_string(),
            name: "n".into(),
            email: "e@x.io".into(),
        };
        assert!(ctx("super_admin").is_elevated());
        assert!(ctx("admin").is_elevated());
        assert!(!ctx("staff").is_elevated());
    }
}
