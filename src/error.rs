use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MoguError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Training error: {0}")]
    Training(String),

    #[error("Invalid context: {0}")]
    InvalidContext(String),

    #[error("Search provider error: {0}")]
    Provider(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for MoguError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            MoguError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            MoguError::Json(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            MoguError::InvalidContext(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg.clone()),
            // Too few records is a low-data state, not a server failure.
            MoguError::Training(msg) => (StatusCode::CONFLICT, msg.clone()),
            MoguError::Database(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            MoguError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            MoguError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            MoguError::Http(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            MoguError::Provider(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
        };

        let body = Json(json!({
            "error": message,
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, MoguError>;
