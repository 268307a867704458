use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use crate::models::ApiResponse;
use crate::services::admin::AdminError;

/// Every failed request, read or write, answers with the same envelope:
/// `{ "success": false, "error": "..." }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    Database(String),
}

impl ApiError {
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::NotFound(format!("{} {} not found", resource, id))
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::warn!("Request rejected ({}): {}", status, self);
        }
        (status, Json(ApiResponse::<()>::error(self.to_string()))).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        ApiError::Database(err.to_string())
    }
}

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        match err {
            AdminError::Validation(e) => ApiError::Validation(e.to_string()),
            AdminError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            AdminError::Store(e) if is_foreign_key_violation(&e) => ApiError::Validation(e.to_string()),
            AdminError::Store(e) => ApiError::Database(e.to_string()),
        }
    }
}

/// A write pointing at a row that does not exist is the caller's mistake.
fn is_foreign_key_violation(err: &anyhow::Error) -> bool {
    err.downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|db| db.is_foreign_key_violation())
}
