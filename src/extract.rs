// src/extract.rs
//! Drop-in replacements for axum's `Json`, `Path` and `Query` whose rejections
//! are answered with the usual `AppError` envelope instead of plain text.
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Request};
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::error::AppError;

pub struct Json<T>(pub T);

impl<T, S> FromRequest<S> for Json<T>
where
    axum::Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let axum::Json(value) = axum::Json::<T>::from_request(req, state).await?;
        Ok(Json(value))
    }
}

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

pub struct Path<T>(pub T);

impl<T, S> FromRequestParts<S> for Path<T>
where
    axum::extract::Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Path(value) = axum::extract::Path::<T>::from_request_parts(parts, state).await?;
        Ok(Path(value))
    }
}

pub struct Query<T>(pub T);

impl<T, S> FromRequestParts<S> for Query<T>
where
    axum::extract::Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let axum::extract::Query(value) = axum::extract::Query::<T>::from_request_parts(parts, state).await?;
        Ok(Query(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::StatusCode;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Line {
        quantity: i32,
    }

    fn json_request(body: &str) -> Request {
        Request::post("/")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn well_formed_body_is_extracted() {
        let Json(line) = Json::<Line>::from_request(json_request(r#"{"quantity": 3}"#), &()).await.unwrap();
        assert_eq!(line.quantity, 3);
    }

    #[tokio::test]
    async fn fractional_quantity_is_invalid_input() {
        let err = Json::<Line>::from_request(json_request(r#"{"quantity": 1.5}"#), &())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn missing_content_type_is_invalid_input() {
        let req = Request::post("/").body(Body::from(r#"{"quantity": 3}"#)).unwrap();
        let err = Json::<Line>::from_request(req, &()).await.err().unwrap();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bad_query_string_is_invalid_input() {
        let (mut parts, _) = Request::get("/?quantity=lots").body(Body::empty()).unwrap().into_parts();
        let err = Query::<Line>::from_request_parts(&mut parts, &()).await.err().unwrap();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }
}
