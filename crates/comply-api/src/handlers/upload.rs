//! Upload handlers: store, list, review, and document downloads.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use chrono::NaiveDate;
use serde_json::Value;
use uuid::Uuid;

use comply_core::error::AppError;
use comply_core::types::{RequirementId, UploadId};
use comply_entity::upload::ApprovalStatus;
use comply_service::upload::{DownloadResult, NewUpload};

use super::form::{file, multipart_error, optional_text};
use crate::dto::request::{InlineQuery, ReviewRequest, SignedDownloadQuery, UploadListQuery};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams};
use crate::handlers::{message, ok};
use crate::state::AppState;

/// GET /api/uploads?requirement_id=
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<UploadListQuery>,
) -> ApiResult<Json<Value>> {
    let page = params.into_page_request();
    let uploads = state
        .upload_service
        .list(&auth, filter.requirement_id, &page)
        .await?;
    Ok(ok(uploads))
}

/// POST /api/uploads (multipart: requirement_id, doc_file, comments, and
/// for admins deadline_at_upload, approval_status, admin_remarks)
pub async fn store(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let mut requirement_id = None;
    let mut document: Option<(String, Bytes)> = None;
    let mut comments = None;
    let mut deadline_at_upload = None;
    let mut approval_status = None;
    let mut admin_remarks = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "requirement_id" => requirement_id = optional_text(field).await?,
            "doc_file" => document = Some(file(field).await?),
            "comments" => comments = optional_text(field).await?,
            "deadline_at_upload" => {
                deadline_at_upload = optional_text(field)
                    .await?
                    .map(|d| {
                        NaiveDate::parse_from_str(&d, "%Y-%m-%d").map_err(|_| {
                            AppError::validation("The deadline at upload is not a valid date.")
                        })
                    })
                    .transpose()?;
            }
            "approval_status" => {
                approval_status = optional_text(field)
                    .await?
                    .map(|s| s.parse::<ApprovalStatus>())
                    .transpose()?;
            }
            "admin_remarks" => admin_remarks = optional_text(field).await?,
            _ => {}
        }
    }

    let requirement_id = requirement_id
        .ok_or_else(|| AppError::validation("The requirement id field is required."))?;
    let requirement_id = Uuid::parse_str(&requirement_id)
        .map(RequirementId::from)
        .map_err(|_| AppError::validation("The selected requirement id is invalid."))?;
    let (file_name, bytes) = document.unwrap_or_default();

    let upload = state
        .upload_service
        .store(
            &auth,
            NewUpload {
                requirement_id,
                file_name,
                bytes,
                comments,
                deadline_at_upload,
                approval_status,
                admin_remarks,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, ok(upload)))
}

/// GET /api/uploads/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UploadId>,
) -> ApiResult<Json<Value>> {
    Ok(ok(state.upload_service.show(&auth, id).await?))
}

/// DELETE /api/uploads/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UploadId>,
) -> ApiResult<Json<Value>> {
    state.upload_service.delete(&auth, id).await?;
    Ok(message("Upload deleted successfully."))
}

/// POST /api/uploads/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UploadId>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let review = review_body(&body)?;
    let upload = state
        .upload_service
        .approve(&auth, id, review.remarks)
        .await?;
    Ok(ok(upload))
}

/// POST /api/uploads/{id}/reject
pub async fn reject(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UploadId>,
    body: Bytes,
) -> ApiResult<Json<Value>> {
    let review = review_body(&body)?;
    let upload = state
        .upload_service
        .reject(&auth, id, review.remarks)
        .await?;
    Ok(ok(upload))
}

/// Review bodies are optional; an empty body means no remarks.
fn review_body(body: &[u8]) -> Result<ReviewRequest, AppError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ReviewRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AppError::validation(format!("Invalid request body: {e}")))
}

/// GET /api/uploads/{id}/download?inline=1
pub async fn download(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UploadId>,
    Query(query): Query<InlineQuery>,
) -> ApiResult<Response> {
    let result = state
        .access_service
        .download(&auth, id, query.is_inline())
        .await?;
    Ok(stream_document(result)?)
}

/// GET /api/uploads/{id}/signed-url?inline=1
pub async fn signed_url(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<UploadId>,
    Query(query): Query<InlineQuery>,
) -> ApiResult<Json<Value>> {
    let link = state
        .access_service
        .signed_url(&auth, id, query.is_inline())
        .await?;
    Ok(ok(link))
}

/// GET /api/uploads/{id}/signed-download?token=
pub async fn signed_download(
    State(state): State<AppState>,
    Path(id): Path<UploadId>,
    Query(query): Query<SignedDownloadQuery>,
) -> ApiResult<Response> {
    let result = state
        .access_service
        .signed_download(id, &query.token)
        .await?;
    Ok(stream_document(result)?)
}

fn stream_document(result: DownloadResult) -> Result<Response, AppError> {
    let disposition = if result.inline { "inline" } else { "attachment" };

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, result.content_type)
        .header(
            header::CONTENT_DISPOSITION,
            format!("{disposition}; filename=\"{}\"", result.filename),
        )
        .header(header::CONTENT_LENGTH, result.size)
        .header(header::CACHE_CONTROL, "private, no-store")
        .body(Body::from_stream(result.stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_review_body_has_no_remarks() {
        assert!(review_body(b"").unwrap().remarks.is_none());
        assert!(review_body(b"  \n").unwrap().remarks.is_none());
    }

    #[test]
    fn test_review_body_reads_remarks() {
        let review = review_body(br#"{"remarks":"Wrong period"}"#).unwrap();
        assert_eq!(review.remarks.as_deref(), Some("Wrong period"));
        assert!(review_body(b"{not json").is_err());
    }
}
