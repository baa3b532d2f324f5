use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use schoolgate_core::AppError;
use tracing::{debug, error, info};

mod types;

pub use types::ErrorResponse;

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let category = self.0.log_category();

        match self.0 {
            AppError::Internal(_) => error!(category, error = %self.0, "request failed"),
            AppError::Forbidden(_) | AppError::Unauthorized(_) | AppError::RateLimited(_) => {
                info!(category, status = status.as_u16(), error = %self.0, "request rejected");
            }
            _ => debug!(category, status = status.as_u16(), error = %self.0, "request rejected"),
        }

        let payload = Json(ErrorResponse::new(self.0.to_string()));

        (status, payload).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
