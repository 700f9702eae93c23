use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The search engine refused the request (bad sort field, malformed paging, ...).
    /// Carries the engine's error payload untouched.
    #[error("Search rejected: {0}")]
    SearchRejected(Value),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("External API error: {0}")]
    ExternalApi(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, Value::String(msg)),
            AppError::SearchRejected(payload) => (StatusCode::BAD_REQUEST, payload),
            AppError::HttpClient(_) | AppError::ExternalApi(_) => {
                tracing::error!(error = %self, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Value::String(self.to_string()),
                )
            }
        };

        let body = Json(ErrorBody { detail });

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Body of every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Fixed message, or the search engine's error payload as-is
    #[schema(value_type = Object)]
    pub detail: Value,
}
