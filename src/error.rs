use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    /// A stored row could not be interpreted (bad date, unknown category, ...).
    #[error("data integrity violation in expense {id}: {reason}")]
    DataIntegrity { id: i64, reason: String },

    #[error("invalid expense: {0}")]
    Validation(String),

    /// A monthly sum left the range `Decimal` can hold.
    #[error("total for {what} in {period} is out of range")]
    Overflow { period: String, what: String },
}

impl AppError {
    pub fn integrity(id: i64, reason: impl Into<String>) -> Self {
        AppError::DataIntegrity {
            id,
            reason: reason.into(),
        }
    }

    pub fn overflow(period: impl ToString, what: impl Into<String>) -> Self {
        AppError::Overflow {
            period: period.to_string(),
            what: what.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// An [`AppError`] paired with the message shown to the HTTP client.
#[derive(Debug)]
pub struct ApiError {
    pub message: &'static str,
    pub error: AppError,
}

impl ApiError {
    pub fn new(message: &'static str, error: AppError) -> Self {
        Self { message, error }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status();
        if status.is_server_error() {
            tracing::error!(error = %self.error, "{}", self.message);
        } else {
            tracing::warn!(error = %self.error, "{}", self.message);
        }
        let body = Json(json!({
            "message": self.message,
            "error": self.error.to_string(),
        }));
        (status, body).into_response()
    }
}
