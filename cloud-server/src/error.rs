//! Error handling
//!
//! Every failure leaves the server as an `{status: "error", message}`
//! envelope; internal detail goes to the log, not the client.

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};

use airhealth_core::ModelError;

use crate::models::Envelope;
use crate::store::StoreError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Resource errors
    NotFound(String),

    // Model errors
    ModelError(String),

    // Store errors
    StoreError(String),

    // Generic errors
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.as_str()),
            AppError::ModelError(msg) => {
                tracing::error!("Model error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Model inference failed")
            }
            AppError::StoreError(msg) => {
                tracing::error!("Store error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error occurred")
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        (status, Json(Envelope::error(error_message))).into_response()
    }
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::ModelError(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        AppError::StoreError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::InternalError(format!("blocking task failed: {}", err))
    }
}
