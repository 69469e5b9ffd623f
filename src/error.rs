use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

use crate::inference::InferenceError;
use crate::models::ErrorResponse;
use crate::validation::ValidationErrors;

/// Failures surfaced by the HTTP layer, each with its own status and body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid JSON body")]
    MalformedRequest,

    #[error("validation failed for {} field(s)", .0.len())]
    Validation(ValidationErrors),

    #[error("prediction failed: {0}")]
    Prediction(String),
}

impl From<InferenceError> for ApiError {
    fn from(e: InferenceError) -> Self {
        ApiError::Prediction(e.to_string())
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MalformedRequest | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::MalformedRequest => ErrorResponse::new("Invalid JSON body"),
            ApiError::Validation(details) => ErrorResponse {
                details: Some(details.clone()),
                ..ErrorResponse::new("validation")
            },
            ApiError::Prediction(message) => ErrorResponse {
                message: Some(message.clone()),
                ..ErrorResponse::new("prediction_failed")
            },
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}
