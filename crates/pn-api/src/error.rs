//! HTTP mapping for `AppError`.
//!
//! Only the minimal detail crosses the boundary: store failures are logged
//! here and answered with a generic body.

use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use pn_core::error::AppError;
use pn_core::wire::ErrorBody;

#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Network(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match &self.0 {
            AppError::ValidationError(msg) | AppError::Conflict(msg) => msg.clone(),
            AppError::NotFound(what, id) => format!("{what} {id} not found"),
            AppError::Store(detail) | AppError::Network(detail) => {
                log::error!("request failed: {}", detail);
                "internal server error".to_string()
            }
        };
        HttpResponse::build(self.status_code()).json(ErrorBody { error: message })
    }
}

/// Shorthand for a 400.
pub fn validation(msg: &str) -> ApiError {
    ApiError(AppError::ValidationError(msg.to_string()))
}
