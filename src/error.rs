use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::constants::*;
use crate::db::RepoError;
use crate::lifecycle::SheetError;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepoError),

    #[error("Category not found")]
    CategoryNotFound,

    #[error("Category already exists")]
    CategoryExists,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large")]
    FileTooLarge,

    #[error("Access token required")]
    MissingToken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Server configuration error: {0}")]
    Misconfigured(String),
}

/// Implement IntoResponse to convert AppError into HTTP responses
///
/// Every error body carries `error` (a short label) and `message` (the text
/// the web client displays).
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::Sheet(ref err) => match err {
                SheetError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), msg.clone()),
                SheetError::NotFound => (
                    StatusCode::NOT_FOUND,
                    "Sheet not found".to_string(),
                    MSG_SHEET_NOT_FOUND.to_string(),
                ),
                SheetError::UploadFailed(e) => {
                    tracing::error!("Upload error: {:?}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to upload file to storage".to_string(),
                        MSG_SHEET_CREATE_FAILED.to_string(),
                    )
                }
                SheetError::PersistFailed { remote_ref, source } => {
                    tracing::error!(
                        "Persist error (orphaned object {}): {:?}",
                        remote_ref,
                        source
                    );
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Failed to create sheet".to_string(),
                        MSG_SHEET_CREATE_FAILED.to_string(),
                    )
                }
                SheetError::Repository(e) => {
                    tracing::error!("Repository error: {:?}", e);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Internal server error".to_string(),
                        MSG_INTERNAL.to_string(),
                    )
                }
            },
            AppError::Repository(ref e) => {
                tracing::error!("Repository error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    MSG_INTERNAL.to_string(),
                )
            }
            AppError::CategoryNotFound => (
                StatusCode::NOT_FOUND,
                "Category not found".to_string(),
                MSG_CATEGORY_NOT_FOUND.to_string(),
            ),
            AppError::CategoryExists => (
                StatusCode::CONFLICT,
                "Category already exists".to_string(),
                MSG_CATEGORY_EXISTS.to_string(),
            ),
            AppError::InvalidInput(ref msg) => (StatusCode::BAD_REQUEST, msg.clone(), msg.clone()),
            AppError::FileTooLarge => (
                StatusCode::BAD_REQUEST,
                ERR_FILE_TOO_LARGE.to_string(),
                MSG_FILE_TOO_LARGE.to_string(),
            ),
            AppError::MissingToken => (
                StatusCode::UNAUTHORIZED,
                "Access token required".to_string(),
                MSG_TOKEN_REQUIRED.to_string(),
            ),
            AppError::InvalidToken => (
                StatusCode::FORBIDDEN,
                "Invalid or expired token".to_string(),
                MSG_TOKEN_INVALID.to_string(),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid credentials".to_string(),
                MSG_INVALID_CREDENTIALS.to_string(),
            ),
            AppError::Misconfigured(ref msg) => {
                tracing::error!("Server configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server configuration error".to_string(),
                    MSG_SERVER_CONFIG.to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error,
            "message": message,
        }));

        (status, body).into_response()
    }
}

/// Result type alias for application results
pub type Result<T> = std::result::Result<T, AppError>;
