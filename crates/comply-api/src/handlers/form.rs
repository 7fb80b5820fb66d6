//! Multipart form helpers shared by the upload and import handlers.

use axum::extract::multipart::{Field, MultipartError};
use bytes::Bytes;

use comply_core::error::AppError;

pub(crate) fn multipart_error(e: MultipartError) -> AppError {
    AppError::validation(format!("Multipart error: {}", e.body_text()))
}

/// Trimmed text of a field; blank values become `None`.
pub(crate) async fn optional_text(field: Field<'_>) -> Result<Option<String>, AppError> {
    let text = field.text().await.map_err(multipart_error)?;
    let text = text.trim();
    Ok((!text.is_empty()).then(|| text.to_string()))
}

/// Original file name and contents of a file field.
pub(crate) async fn file(field: Field<'_>) -> Result<(String, Bytes), AppError> {
    let name = field.file_name().unwrap_or_default().to_string();
    let bytes = field.bytes().await.map_err(multipart_error)?;
    Ok((name, bytes))
}
