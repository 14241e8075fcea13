use crate::services::gemini::GeminiError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub const GENERIC_ERROR_MESSAGE: &str = "Internal Server Error";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("No image file uploaded")]
    NoFile,

    #[error("Only one image can be uploaded at a time")]
    MultipleFiles,

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Too Many Requests: {0}")]
    TooManyRequests(String),

    #[error("Failed to stage upload: {0}")]
    StagingWrite(#[source] std::io::Error),

    #[error("Description service failed: {0}")]
    DescriptionService(#[source] GeminiError),

    #[error("Roast generation failed: {0}")]
    Generation(#[source] GeminiError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal Server Error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NoFile | AppError::MultipleFiles | AppError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::StagingWrite(_)
            | AppError::DescriptionService(_)
            | AppError::Generation(_)
            | AppError::InvalidInput(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::NoFile | AppError::MultipleFiles => self.to_string(),
            AppError::BadRequest(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::Forbidden(msg)
            | AppError::TooManyRequests(msg) => msg.clone(),
            _ => {
                tracing::error!("Request failed: {:?}", self);
                GENERIC_ERROR_MESSAGE.to_string()
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
