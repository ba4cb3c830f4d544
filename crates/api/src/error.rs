//! Renders `AppError` into the uniform `{ "error", "message" }` body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use oasys_shared::AppError;

/// Builds the error response for an `AppError`: its status code with an
/// `{ "error": code, "message": text }` body.
pub(crate) fn error_response(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (
        status,
        Json(json!({ "error": err.error_code(), "message": err.message() })),
    )
        .into_response()
}

/// Shorthand for the generic 500 body routes return when a database or
/// infrastructure failure must stay opaque to the client.
pub(crate) fn internal_error(message: &str) -> Response {
    error_response(&AppError::Internal(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_rendering() {
        let response = error_response(&AppError::NotFound("Resource not found".into()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let json = body_json(response).await;
        assert_eq!(json["error"], "not_found");
        assert_eq!(json["message"], "Resource not found");
    }

    #[tokio::test]
    async fn test_forbidden_rendering() {
        let response = error_response(&AppError::Forbidden("No".into()));
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let json = body_json(response).await;
        assert_eq!(json["error"], "forbidden");
    }

    #[tokio::test]
    async fn test_validation_rendering() {
        let response = error_response(&AppError::Validation("Invalid value for x: y".into()));
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let json = body_json(response).await;
        assert_eq!(json["error"], "validation_error");
        assert_eq!(json["message"], "Invalid value for x: y");
    }

    #[tokio::test]
    async fn test_internal_error_shorthand() {
        let response = internal_error("An internal error occurred");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let json = body_json(response).await;
        assert_eq!(json["error"], "internal_error");
        assert_eq!(json["message"], "An internal error occurred");
    }
}
