//! Authentication and signed download links.

use axum::http::StatusCode;

use comply_core::types::{UploadId, UserId};
use comply_entity::user::UserRole;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = TestApp::offline().await;

    for path in [
        "/api/me",
        "/api/requirements",
        "/api/uploads",
        "/api/dashboard/stats",
        "/api/audit-logs",
    ] {
        let response = app.request("GET", path, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(response.body["error"], "UNAUTHENTICATED");
    }
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = TestApp::offline().await;

    let response = app
        .request("GET", "/api/requirements", None, Some("not.a.jwt"))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_refresh_token_is_not_an_access_token() {
    let app = TestApp::offline().await;
    let pair = comply_auth::JwtEncoder::new(&app.config.auth)
        .generate_token_pair(
            UserId::new(),
            comply_core::types::SessionId::new(),
            UserRole::SuperAdmin,
            "admin@example.com",
        )
        .unwrap();

    let response = app
        .request("GET", "/api/me", None, Some(&pair.refresh_token))
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_audit_log_is_super_admin_only() {
    let app = TestApp::offline().await;
    let token = app.token_for(UserRole::Pic);

    let response = app
        .request("GET", "/api/audit-logs", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_signed_download_rejects_bad_token() {
    let app = TestApp::offline().await;
    let path = format!("/api/uploads/{}/signed-download?token=bogus", UploadId::new());

    let response = app.request("GET", &path, None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signed_download_is_bound_to_one_upload() {
    let app = TestApp::offline().await;
    let (token, _) = comply_auth::JwtEncoder::new(&app.config.auth)
        .sign_download(UploadId::new(), UserId::new(), false)
        .unwrap();
    let path = format!(
        "/api/uploads/{}/signed-download?token={token}",
        UploadId::new()
    );

    let response = app.request("GET", &path, None, None).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_access_token_cannot_sign_downloads() {
    let app = TestApp::offline().await;
    let access = app.token_for(UserRole::SuperAdmin);
    let path = format!(
        "/api/uploads/{}/signed-download?token={access}",
        UploadId::new()
    );

    let response = app.request("GET", &path, None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
