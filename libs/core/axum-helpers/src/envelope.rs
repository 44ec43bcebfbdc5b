//! Response envelope shared by every handler.
//!
//! The back office's clients expect every business response with HTTP 200 and
//! the outcome inside the body:
//!
//! ```json
//! { "status_code": 0, "error_msg": "", "body": { ... } }
//! ```
//!
//! `status_code` 0 means success; non-zero carries the logical error code
//! (400, 401, 404, 500) with `body` null. Only the authentication middleware
//! rejects with a real HTTP status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

/// Business-level response wrapper, always sent with HTTP 200.
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub status_code: i32,
    pub error_msg: String,
    pub body: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(body: T) -> Self {
        Self {
            status_code: 0,
            error_msg: String::new(),
            body: Some(body),
        }
    }

    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            status_code: code,
            error_msg: message.into(),
            body: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// `{ total, list }` payload of every `POST /<entity>/list` endpoint.
///
/// `total` is the filtered row count before pagination.
#[derive(Debug, Serialize)]
pub struct ListBody<T: Serialize> {
    pub total: u64,
    pub list: Vec<T>,
}

/// `{ "success": true }` payload for update/delete style endpoints.
#[derive(Debug, Serialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Application error type that renders as an error envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Database(#[from] DbErr),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Logical code carried in `status_code`.
    pub fn code(&self) -> i32 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::Database(DbErr::RecordNotFound(_)) => 404,
            ApiError::Database(_) | ApiError::Internal(_) => 500,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::BadRequest(errors.to_string())
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(error: axum::extract::multipart::MultipartError) -> Self {
        ApiError::BadRequest(error.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.code();
        let message = self.to_string();

        if code >= 500 {
            tracing::error!(status_code = code, "request failed: {}", message);
        } else {
            tracing::info!(status_code = code, "request rejected: {}", message);
        }

        Envelope::<serde_json::Value>::error(code, message).into_response()
    }
}

/// Handler return type: a success envelope or an error envelope.
pub type ApiResult<T> = Result<Envelope<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_envelope_serializes_with_zero_status() {
        let envelope = Envelope::ok(serde_json::json!({"id": 7}));
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status_code"], 0);
        assert_eq!(json["error_msg"], "");
        assert_eq!(json["body"]["id"], 7);
    }

    #[test]
    fn error_envelope_has_null_body() {
        let envelope = Envelope::<serde_json::Value>::error(404, "Бичлэг олдсонгүй");
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status_code"], 404);
        assert_eq!(json["error_msg"], "Бичлэг олдсонгүй");
        assert!(json["body"].is_null());
    }

    #[test]
    fn db_record_not_found_maps_to_404() {
        let error = ApiError::Database(DbErr::RecordNotFound("customers".to_string()));
        assert_eq!(error.code(), 404);
    }

    #[test]
    fn db_other_errors_map_to_500() {
        let error = ApiError::Database(DbErr::Custom("connection reset".to_string()));
        assert_eq!(error.code(), 500);
    }

    #[test]
    fn list_body_shape() {
        let body = ListBody {
            total: 42,
            list: vec![1, 2, 3],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["total"], 42);
        assert_eq!(json["list"].as_array().unwrap().len(), 3);
    }
}
