use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal server error: {0}")]
    Internal(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Insufficient balance")]
    InsufficientFunds,
    #[error("Invalid rig type: {0}")]
    InvalidRigType(String),
    #[error("Mining period is completed for this rig and cannot be resumed")]
    AlreadyCompleted,
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::Config(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::InsufficientFunds => {
                (StatusCode::BAD_REQUEST, "Insufficient balance".to_string())
            }
            AppError::InvalidRigType(msg) => {
                (StatusCode::BAD_REQUEST, format!("Invalid rig type: {}", msg))
            }
            AppError::AlreadyCompleted => (
                StatusCode::BAD_REQUEST,
                "Mining period is completed for this rig and cannot be resumed".to_string(),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}
