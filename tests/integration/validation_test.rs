//! Request validation that happens before any database work.

use axum::http::StatusCode;

use comply_entity::user::UserRole;

use crate::helpers::{TestApp, pdf_bytes};

#[tokio::test]
async fn test_login_rejects_malformed_email() {
    let app = TestApp::offline().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "email": "not-an-email", "password": "x" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
    assert!(response.body["details"]["email"].is_array());
}

#[tokio::test]
async fn test_login_rejects_unparseable_body() {
    let app = TestApp::offline().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "email": 42 })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_upload_requires_requirement_id() {
    let app = TestApp::offline().await;
    let token = app.token_for(UserRole::Pic);
    let pdf = pdf_bytes();

    let response = app
        .multipart(
            "/api/uploads",
            &[
                ("doc_file", Some("permit.pdf"), pdf.as_slice()),
                ("comments", None, b"Q1".as_slice()),
            ],
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        response.body["message"],
        "The requirement id field is required."
    );
}

#[tokio::test]
async fn test_upload_rejects_bad_approval_status() {
    let app = TestApp::offline().await;
    let token = app.token_for(UserRole::SuperAdmin);
    let requirement_id = uuid::Uuid::new_v4().to_string();

    let response = app
        .multipart(
            "/api/uploads",
            &[
                ("requirement_id", None, requirement_id.as_bytes()),
                ("approval_status", None, b"MAYBE".as_slice()),
            ],
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_import_is_super_admin_only() {
    let app = TestApp::offline().await;
    let token = app.token_for(UserRole::AdminSpecialist);

    let response = app
        .multipart(
            "/api/requirements/import",
            &[("file", Some("register.csv"), b"agency\n".as_slice())],
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_import_requires_file() {
    let app = TestApp::offline().await;
    let token = app.token_for(UserRole::SuperAdmin);

    let response = app
        .multipart(
            "/api/requirements/import",
            &[("note", None, b"no file here".as_slice())],
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["message"], "The file field is required.");
}

#[tokio::test]
async fn test_review_rejects_malformed_body() {
    let app = TestApp::offline().await;
    let token = app.token_for(UserRole::SuperAdmin);
    let path = format!("/api/uploads/{}/approve", uuid::Uuid::new_v4());

    let response = app.send_raw("POST", &path, b"{remarks", Some(&token)).await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
}
