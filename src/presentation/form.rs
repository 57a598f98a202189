// Form extraction - Multipart and urlencoded bodies as one set of fields
use crate::presentation::error::ApiError;
use axum::async_trait;
use axum::extract::{Form, FromRequest, Multipart, Request};
use axum::http::header;
use bytes::Bytes;
use std::collections::HashMap;

/// Text fields and uploaded files of a form submission.
///
/// Requests without a form content type yield an empty payload so the
/// handlers can report which fields are missing. When a field repeats, the
/// first value wins.
#[derive(Debug, Default)]
pub struct FormPayload {
    fields: HashMap<String, String>,
    files: HashMap<String, Bytes>,
}

impl FormPayload {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// File upload by field name; multipart parts without a filename count too
    pub fn file(&self, name: &str) -> Option<&Bytes> {
        self.files.get(name)
    }
}

#[async_trait]
impl<S> FromRequest<S> for FormPayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::InvalidForm(e.body_text()))?;
            read_multipart(multipart).await
        } else if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| ApiError::InvalidForm(e.body_text()))?;
            Ok(Self {
                fields,
                files: HashMap::new(),
            })
        } else {
            Ok(Self::default())
        }
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<FormPayload, ApiError> {
    let mut payload = FormPayload::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::InvalidForm(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let is_file = field.file_name().is_some();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::InvalidForm(e.body_text()))?;

        if !is_file {
            if let Ok(text) = std::str::from_utf8(&data) {
                payload.fields.entry(name.clone()).or_insert_with(|| text.to_string());
            }
        }
        payload.files.entry(name).or_insert(data);
    }

    Ok(payload)
}
