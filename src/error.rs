// src/error.rs
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

use crate::database::{is_foreign_key_violation, is_unique_violation};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("validation failed")]
    Validation(#[from] ValidationErrors),
    #[error("{0}")]
    NotFound(String),
    #[error("insufficient stock for {item}")]
    InsufficientStock { item: String },
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<Vec<FieldError>>,
}

impl AppError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        AppError::InvalidInput(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AppError::NotFound(msg.into())
    }

    pub fn insufficient_stock(item: impl Into<String>) -> Self {
        AppError::InsufficientStock { item: item.into() }
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AppError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AppError::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }

    /// Turns a unique violation into `Conflict(message)`; other errors pass through.
    pub fn on_unique(err: sqlx::Error, message: &str) -> Self {
        if is_unique_violation(&err) {
            AppError::conflict(message)
        } else {
            err.into()
        }
    }

    /// Turns a foreign-key violation into `Conflict(message)`; other errors pass through.
    pub fn on_foreign_key(err: sqlx::Error, message: &str) -> Self {
        if is_foreign_key_violation(&err) {
            AppError::conflict(message)
        } else {
            err.into()
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::Validation(_) | AppError::InsufficientStock { .. } => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(format!("invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(format!("invalid path parameter: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(format!("invalid query string: {}", rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            AppError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                ErrorBody { message: "Database error occurred".to_string(), errors: None }
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ErrorBody { message: "Internal server error".to_string(), errors: None }
            }
            AppError::Validation(errors) => ErrorBody {
                message: "validation failed".to_string(),
                errors: Some(field_errors(&errors)),
            },
            other => ErrorBody { message: other.to_string(), errors: None },
        };

        (status, Json(body)).into_response()
    }
}

fn field_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |e| FieldError {
                field: field.clone(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("failed '{}' check", e.code)),
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;
    use validator::Validate;

    async fn body_json(err: AppError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[derive(Validate)]
    struct NamedThing {
        #[validate(length(min = 3, message = "name must be at least 3 characters"))]
        name: String,
    }

    #[tokio::test]
    async fn insufficient_stock_is_a_bad_request_naming_the_item() {
        let (status, body) = body_json(AppError::insufficient_stock("'Bolt M6' (id 7)")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "insufficient stock for 'Bolt M6' (id 7)");
        assert!(body.get("errors").is_none());
    }

    #[tokio::test]
    async fn storage_failures_hide_driver_details() {
        let (status, body) = body_json(AppError::Database(sqlx::Error::PoolTimedOut)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Database error occurred");
    }

    #[tokio::test]
    async fn validation_errors_are_listed_per_field() {
        let errors = NamedThing { name: "ab".into() }.validate().unwrap_err();
        let (status, body) = body_json(AppError::from(errors)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["errors"][0]["field"], "name");
        assert_eq!(body["errors"][0]["message"], "name must be at least 3 characters");
    }

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(AppError::invalid_input("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::not_found("x").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::unauthorized("x").status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::forbidden("x").status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::conflict("x").status_code(), StatusCode::CONFLICT);
        assert_eq!(AppError::internal("x").status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn non_constraint_errors_pass_through_on_unique() {
        let err = AppError::on_unique(sqlx::Error::RowNotFound, "SKU already exists");
        assert!(matches!(err, AppError::Database(sqlx::Error::RowNotFound)));
    }
}
