use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use pythagoras_core::api::ErrorResponse;

use crate::service::RankingError;

/// Message returned for every 500; details stay in the server log.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

#[derive(Debug)]
pub enum AppError {
    BadRequest(String),
    Unauthorized(String),
    Internal(String),
}

impl AppError {
    pub fn internal() -> Self {
        Self::Internal(INTERNAL_ERROR_MESSAGE.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(m) | Self::Unauthorized(m) | Self::Internal(m) => write!(f, "{m}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            Self::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m),
            Self::Internal(m) => (StatusCode::INTERNAL_SERVER_ERROR, m),
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

impl From<RankingError> for AppError {
    fn from(err: RankingError) -> Self {
        match err {
            RankingError::InvalidName | RankingError::InvalidScore => {
                Self::BadRequest(err.to_string())
            },
            RankingError::Unauthorized => Self::Unauthorized(err.to_string()),
            // logged with context by the service
            RankingError::StorageFailure(_) => Self::internal(),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(format!("invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(format!("invalid path: {}", rejection.body_text()))
    }
}
