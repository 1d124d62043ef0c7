use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extract::ExtractError;
use crate::fetch::FetchError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    /// The target page could not be retrieved.
    #[error("Upstream error: {0}")]
    Upstream(FetchError),
}

/// Requests the guard refuses to send are the caller's fault; every other
/// fetch failure is reported as an upstream failure.
impl From<ExtractError> for AppError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::InvalidUrl(msg) => AppError::Validation(format!("Invalid URL: {msg}")),
            ExtractError::Transport(FetchError::BlockedHost) => AppError::Validation(
                "URL resolves to a private or reserved address".into(),
            ),
            ExtractError::Transport(e) => AppError::Upstream(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message): (StatusCode, String) = match self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Upstream(e) => {
                tracing::warn!(error = %e, "Metadata extraction failed upstream");
                (StatusCode::BAD_GATEWAY, "Failed to fetch metadata".into())
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
