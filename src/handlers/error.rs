use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use tracing::error;

use super::types::ErrorResponse;
use crate::errors::AdminError;

/// [`AdminError`] rendered as a JSON error response
#[derive(Debug)]
pub struct ApiError(pub AdminError);

impl From<AdminError> for ApiError {
    fn from(err: AdminError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            AdminError::InvalidAddress(_)
            | AdminError::InvalidAmount(_)
            | AdminError::UnsupportedNetwork(_) => StatusCode::BAD_REQUEST,
            AdminError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AdminError::NotFound(_) => StatusCode::NOT_FOUND,
            AdminError::Busy(_) | AdminError::WalletNotConnected(_) => StatusCode::CONFLICT,
            AdminError::ReadError(_)
            | AdminError::SubmissionError(_)
            | AdminError::ConfirmationError(_) => StatusCode::BAD_GATEWAY,
            AdminError::Config(_)
            | AdminError::Crypto(_)
            | AdminError::InvalidKey(_)
            | AdminError::Internal(_)
            | AdminError::Tls(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Host-side failures are logged in full and reported generically
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Internal error: {}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };

        let body = ErrorResponse {
            error: message,
            code: self.0.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}
