//! Document downloads and short-lived signed links.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use comply_auth::{JwtDecoder, JwtEncoder};
use comply_core::error::AppError;
use comply_core::result::AppResult;
use comply_core::traits::{ByteStream, StorageProvider};
use comply_core::types::UploadId;
use comply_database::repositories::{AssignmentRepository, UploadRepository};
use comply_entity::upload::Upload;

use crate::context::RequestContext;

/// A signed link to one upload.
#[derive(Debug, Clone, Serialize)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// A stored document ready to stream.
pub struct DownloadResult {
    pub upload: Upload,
    pub stream: ByteStream,
    pub size: u64,
    pub content_type: &'static str,
    /// Suggested filename for Content-Disposition.
    pub filename: String,
    /// Serve with `inline` disposition instead of `attachment`.
    pub inline: bool,
}

impl std::fmt::Debug for DownloadResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadResult")
            .field("upload_id", &self.upload.id)
            .field("size", &self.size)
            .field("filename", &self.filename)
            .field("inline", &self.inline)
            .finish()
    }
}

/// Grants document access to admins, the uploader, and the assignee.
#[derive(Clone)]
pub struct DocumentAccessService {
    upload_repo: Arc<UploadRepository>,
    assignment_repo: Arc<AssignmentRepository>,
    storage: Arc<dyn StorageProvider>,
    encoder: Arc<JwtEncoder>,
    decoder: Arc<JwtDecoder>,
}

impl std::fmt::Debug for DocumentAccessService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentAccessService").finish()
    }
}

impl DocumentAccessService {
    pub fn new(
        upload_repo: Arc<UploadRepository>,
        assignment_repo: Arc<AssignmentRepository>,
        storage: Arc<dyn StorageProvider>,
        encoder: Arc<JwtEncoder>,
        decoder: Arc<JwtDecoder>,
    ) -> Self {
        Self {
            upload_repo,
            assignment_repo,
            storage,
            encoder,
            decoder,
        }
    }

    async fn find(&self, id: UploadId) -> AppResult<Upload> {
        self.upload_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Upload not found"))
    }

    /// Load an upload the caller may read.
    async fn accessible(&self, ctx: &RequestContext, id: UploadId) -> AppResult<Upload> {
        let upload = self.find(id).await?;
        if ctx.is_admin() || upload.uploader_id == ctx.user_id {
            return Ok(upload);
        }
        if let Some(assignment_id) = upload.assignment_id {
            let assigned = self
                .assignment_repo
                .find_by_id(assignment_id)
                .await?
                .is_some_and(|a| a.user_id == ctx.user_id);
            if assigned {
                return Ok(upload);
            }
        }
        Err(AppError::authorization("Unauthorized"))
    }

    /// Stream a document for an authenticated caller.
    pub async fn download(
        &self,
        ctx: &RequestContext,
        id: UploadId,
        inline: bool,
    ) -> AppResult<DownloadResult> {
        let upload = self.accessible(ctx, id).await?;
        self.open(upload, inline).await
    }

    /// Issue a short-lived link that serves the document without a bearer token.
    pub async fn signed_url(
        &self,
        ctx: &RequestContext,
        id: UploadId,
        inline: bool,
    ) -> AppResult<SignedUrl> {
        let upload = self.accessible(ctx, id).await?;
        let (token, expires_at) = self.encoder.sign_download(upload.id, ctx.user_id, inline)?;
        info!(user_id = %ctx.user_id, upload_id = %upload.id, inline, "Signed download link issued");
        Ok(SignedUrl {
            url: signed_download_path(upload.id, &token),
            expires_at,
        })
    }

    /// Serve a document through a signed link.
    pub async fn signed_download(&self, id: UploadId, token: &str) -> AppResult<DownloadResult> {
        let claims = self.decoder.decode_download_token(token, id)?;
        let upload = self.find(id).await?;
        self.open(upload, claims.inline).await
    }

    async fn open(&self, upload: Upload, inline: bool) -> AppResult<DownloadResult> {
        if upload.file_path.is_empty() || !self.storage.exists(&upload.file_path).await? {
            return Err(AppError::not_found("File not found."));
        }
        let size = self.storage.size(&upload.file_path).await?;
        let stream = self.storage.read(&upload.file_path).await?;
        Ok(DownloadResult {
            filename: download_filename(&upload.original_name),
            stream,
            size,
            content_type: "application/pdf",
            inline,
            upload,
        })
    }
}

/// Relative path of the signed download endpoint.
pub fn signed_download_path(id: UploadId, token: &str) -> String {
    format!("/api/uploads/{id}/signed-download?token={token}")
}

/// A header-safe filename; quotes, separators and control characters become `_`.
pub fn download_filename(original: &str) -> String {
    let cleaned: String = original
        .trim()
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '"' | '\\' | '/') {
                '_'
            } else {
                c
            }
        })
        .collect();
    if cleaned.is_empty() {
        "document.pdf".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_filename_is_header_safe() {
        assert_eq!(download_filename("BIR \"2307\".pdf"), "BIR _2307_.pdf");
        assert_eq!(download_filename("../etc/passwd"), ".._etc_passwd");
        assert_eq!(download_filename("  "), "document.pdf");
    }

    #[test]
    fn test_signed_download_path() {
        let id = UploadId::new();
        assert_eq!(
            signed_download_path(id, "abc.def"),
            format!("/api/uploads/{id}/signed-download?token=abc.def")
        );
    }
}
