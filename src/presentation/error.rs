// HTTP error mapping - `{"error": message}` bodies with 400/500 status codes
use crate::application::conversion_service::ConversionError;
use crate::application::tokenizer::TokenizeError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Image file and output format are required.")]
    MissingConversionFields,
    #[error("Unsupported output format.")]
    UnsupportedFormat,
    #[error("No sentence provided")]
    MissingSentence,
    #[error("Invalid form data: {0}")]
    InvalidForm(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingConversionFields
            | ApiError::UnsupportedFormat
            | ApiError::MissingSentence
            | ApiError::InvalidForm(_)
            | ApiError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            ApiError::Conversion(_) | ApiError::Tokenize(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
        } else {
            tracing::debug!("Rejected request: {}", self);
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
