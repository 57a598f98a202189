// HTTP request handlers for the conversion and text analysis services
use crate::domain::image_format::OutputFormat;
use crate::presentation::app_state::{ApiState, ServiceVariant};
use crate::presentation::error::ApiError;
use crate::presentation::form::FormPayload;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Route listing for the running service
pub async fn index(State(state): State<Arc<ApiState>>) -> Json<Value> {
    Json(describe_routes(state.variant()))
}

fn describe_routes(variant: ServiceVariant) -> Value {
    let formats: Vec<&str> = OutputFormat::ALL.iter().map(|f| f.name()).collect();
    let convert = json!({
        "method": "POST",
        "description": "Convert an image from one format to another.",
        "endpoint": "/convert",
        "parameters": {
            "image": "The image file to convert.",
            "output_format": format!("The desired output format. Available formats: {}.", formats.join(", "))
        }
    });

    match variant {
        ServiceVariant::Conversion => json!({
            "message": "Welcome to the image conversion API!",
            "usage": { "convert": convert }
        }),
        ServiceVariant::TextAnalysis => json!({
            "message": "Welcome to the image conversion and text analysis API!",
            "usage": {
                "convert": convert,
                "tokenize": {
                    "method": "POST",
                    "description": "Split a sentence into tokens and tag each token with its part of speech.",
                    "endpoint": "/tokenize",
                    "parameters": {
                        "sentence": "The sentence to tokenize and tag."
                    }
                }
            }
        }),
    }
}

/// Convert an uploaded image to the requested format
pub async fn convert_image(
    State(state): State<Arc<ApiState>>,
    form: FormPayload,
) -> Result<Response, ApiError> {
    let (Some(image), Some(requested)) = (form.file("image"), form.field("output_format")) else {
        return Err(ApiError::MissingConversionFields);
    };
    let format: OutputFormat = requested.parse().map_err(|_| ApiError::UnsupportedFormat)?;

    let service = state.conversion_service.clone();
    let input = image.clone();
    tracing::info!("Converting {} byte upload to {}", input.len(), format);

    let converted = tokio::task::spawn_blocking(move || service.convert(&input, format))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))??;

    Ok(([(header::CONTENT_TYPE, converted.mime_type())], converted.bytes).into_response())
}

/// Tokenize a sentence and tag parts of speech
pub async fn tokenize(State(state): State<Arc<ApiState>>, form: FormPayload) -> Result<Response, ApiError> {
    let sentence = form
        .field("sentence")
        .filter(|s| !s.trim().is_empty())
        .ok_or(ApiError::MissingSentence)?;

    let Some(service) = state.text_service.as_ref() else {
        return Err(ApiError::Internal("text analysis is not enabled".to_string()));
    };

    Ok(Json(service.analyze(sentence)?).into_response())
}
