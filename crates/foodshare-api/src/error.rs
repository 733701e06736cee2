use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid id format")]
    InvalidId,

    #[error("{0}")]
    NotFound(String),

    #[error("no session token provided")]
    Unauthenticated,

    #[error("invalid session token")]
    Forbidden,

    #[error("failed to create food request")]
    RequestPersistFailed(#[source] anyhow::Error),

    #[error("internal server error")]
    Database(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::InvalidId => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::RequestPersistFailed(_) | ApiError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        match &self {
            ApiError::RequestPersistFailed(source) => {
                error!("request persist failed: {:#}", source);
            }
            ApiError::Database(source) => {
                error!("database error: {:#}", source);
            }
            _ => {}
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
