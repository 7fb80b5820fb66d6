//! Requirement to approved document, end to end. Needs PostgreSQL.

use axum::http::{StatusCode, header};
use chrono::{Duration, Utc};
use serde_json::{Value, json};

use comply_entity::user::UserRole;

use crate::helpers::{TestApp, pdf_bytes};

struct Fixture {
    app: TestApp,
    admin_token: String,
    pic_token: String,
    requirement_id: String,
}

/// An admin, a PIC, and one requirement assigned to the PIC due in 30 days.
async fn fixture() -> Fixture {
    let app = TestApp::new().await;
    app.create_user("Grace Admin", "admin@example.com", UserRole::SuperAdmin)
        .await;
    let pic = app
        .create_user("Ana Cruz", "ana@example.com", UserRole::Pic)
        .await;
    let admin_token = app.login("admin@example.com", "password123").await;
    let pic_token = app.login("ana@example.com", "password123").await;

    let agency = app
        .request(
            "POST",
            "/api/agencies",
            Some(json!({ "code": "BIR", "name": "Bureau of Internal Revenue" })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(agency.status, StatusCode::CREATED, "{:?}", agency.body);

    let deadline = Utc::now().date_naive() + Duration::days(30);
    let requirement = app
        .request(
            "POST",
            "/api/requirements",
            Some(json!({
                "agency_id": agency.body["data"]["id"],
                "category": "Tax",
                "title": "Annual Income Tax Return",
                "frequency": "Annual",
                "deadline": deadline,
                "pic_ids": [pic.id],
            })),
            Some(&admin_token),
        )
        .await;
    assert_eq!(requirement.status, StatusCode::CREATED, "{:?}", requirement.body);
    assert_eq!(requirement.body["data"]["req_code"], "BIR-001");
    assert_eq!(
        requirement.body["data"]["assignments"][0]["compliance_status"],
        "PENDING"
    );

    Fixture {
        requirement_id: requirement.body["data"]["id"]
            .as_str()
            .unwrap()
            .to_string(),
        app,
        admin_token,
        pic_token,
    }
}

async fn assignment_status(f: &Fixture) -> Value {
    let detail = f
        .app
        .request(
            "GET",
            &format!("/api/requirements/{}", f.requirement_id),
            None,
            Some(&f.admin_token),
        )
        .await;
    assert_eq!(detail.status, StatusCode::OK);
    detail.body["data"]["assignments"][0]["compliance_status"].clone()
}

async fn upload_pdf(f: &Fixture) -> String {
    let pdf = pdf_bytes();
    let response = f
        .app
        .multipart(
            "/api/uploads",
            &[
                ("requirement_id", None, f.requirement_id.as_bytes()),
                ("doc_file", Some("itr-2026.pdf"), pdf.as_slice()),
                ("comments", None, b"Filed via eBIRForms".as_slice()),
            ],
            Some(&f.pic_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["data"]["approval_status"], "PENDING");
    response.body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_submit_then_approve() {
    let f = fixture().await;

    let upload_id = upload_pdf(&f).await;
    assert_eq!(assignment_status(&f).await, "SUBMITTED");

    let approved = f
        .app
        .request(
            "POST",
            &format!("/api/uploads/{upload_id}/approve"),
            None,
            Some(&f.admin_token),
        )
        .await;
    assert_eq!(approved.status, StatusCode::OK, "{:?}", approved.body);
    assert_eq!(approved.body["data"]["approval_status"], "APPROVED");
    assert_eq!(assignment_status(&f).await, "APPROVED");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_reject_returns_assignment_to_pending() {
    let f = fixture().await;
    let upload_id = upload_pdf(&f).await;

    let rejected = f
        .app
        .request(
            "POST",
            &format!("/api/uploads/{upload_id}/reject"),
            Some(json!({ "remarks": "Wrong taxable year" })),
            Some(&f.admin_token),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::OK, "{:?}", rejected.body);
    assert_eq!(rejected.body["data"]["admin_remarks"], "Wrong taxable year");
    assert_eq!(assignment_status(&f).await, "PENDING");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_pic_cannot_review() {
    let f = fixture().await;
    let upload_id = upload_pdf(&f).await;

    let response = f
        .app
        .request(
            "POST",
            &format!("/api/uploads/{upload_id}/approve"),
            None,
            Some(&f.pic_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_non_pdf_is_refused() {
    let f = fixture().await;

    let response = f
        .app
        .multipart(
            "/api/uploads",
            &[
                ("requirement_id", None, f.requirement_id.as_bytes()),
                ("doc_file", Some("itr.docx"), b"PK\x03\x04".as_slice()),
            ],
            Some(&f.pic_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(assignment_status(&f).await, "PENDING");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_download_and_signed_link() {
    let f = fixture().await;
    let upload_id = upload_pdf(&f).await;

    let download = f
        .app
        .request(
            "GET",
            &format!("/api/uploads/{upload_id}/download"),
            None,
            Some(&f.pic_token),
        )
        .await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(download.headers[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(download.bytes, pdf_bytes());

    let signed = f
        .app
        .request(
            "GET",
            &format!("/api/uploads/{upload_id}/signed-url?inline=1"),
            None,
            Some(&f.admin_token),
        )
        .await;
    assert_eq!(signed.status, StatusCode::OK);
    let url = signed.body["data"]["url"].as_str().unwrap().to_string();

    let via_link = f.app.request("GET", &url, None, None).await;
    assert_eq!(via_link.status, StatusCode::OK);
    let disposition = via_link.headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap();
    assert!(disposition.starts_with("inline"));
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_scheduled_jobs() {
    let f = fixture().await;
    let executor = comply_api::build_executor(&f.app.state);
    let today = Utc::now().date_naive();

    let reminders = executor
        .execute("compliance_reminders", today)
        .await
        .unwrap();
    assert_eq!(reminders["sent"], 1);

    let overdue = executor
        .execute("mark_overdue", today + Duration::days(31))
        .await
        .unwrap();
    assert_eq!(overdue["marked"], 1);
    assert_eq!(assignment_status(&f).await, "OVERDUE");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_actions_are_audited() {
    let f = fixture().await;
    upload_pdf(&f).await;

    let logs = f
        .app
        .request(
            "GET",
            "/api/audit-logs?entity_type=requirement",
            None,
            Some(&f.admin_token),
        )
        .await;
    assert_eq!(logs.status, StatusCode::OK);
    let actions: Vec<&str> = logs.body["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["action"].as_str())
        .collect();
    assert!(actions.contains(&"CREATED"), "{actions:?}");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_lapsed_requirement_reads_late_before_overdue_job() {
    let f = fixture().await;
    let lapsed = Utc::now().date_naive() - Duration::days(3);
    sqlx::query("UPDATE requirements SET deadline = $1")
        .bind(lapsed)
        .execute(f.app.state.db.pool())
        .await
        .unwrap();
    sqlx::query("UPDATE requirement_assignments SET deadline = $1")
        .bind(lapsed)
        .execute(f.app.state.db.pool())
        .await
        .unwrap();

    let detail = f
        .app
        .request(
            "GET",
            &format!("/api/requirements/{}", f.requirement_id),
            None,
            Some(&f.admin_token),
        )
        .await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["data"]["compliance_status"], "Late (100%)");
    assert_eq!(assignment_status(&f).await, "PENDING");
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_review_of_unlinked_upload_leaves_assignments_alone() {
    let f = fixture().await;
    let me = f
        .app
        .request("GET", "/api/me", None, Some(&f.admin_token))
        .await;
    let admin_id = me.body["data"]["id"].clone();
    let detail = f
        .app
        .request(
            "GET",
            &format!("/api/requirements/{}", f.requirement_id),
            None,
            Some(&f.admin_token),
        )
        .await;
    let pic_id = detail.body["data"]["assignments"][0]["user_id"].clone();

    // Filed by an admin who holds no assignment yet.
    let pdf = pdf_bytes();
    let stored = f
        .app
        .multipart(
            "/api/uploads",
            &[
                ("requirement_id", None, f.requirement_id.as_bytes()),
                ("doc_file", Some("itr-2026.pdf"), pdf.as_slice()),
            ],
            Some(&f.admin_token),
        )
        .await;
    assert_eq!(stored.status, StatusCode::CREATED, "{:?}", stored.body);
    assert!(stored.body["data"]["assignment_id"].is_null());
    let upload_id = stored.body["data"]["id"].as_str().unwrap().to_string();

    let updated = f
        .app
        .request(
            "PUT",
            &format!("/api/requirements/{}", f.requirement_id),
            Some(json!({ "pic_ids": [pic_id, admin_id] })),
            Some(&f.admin_token),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{:?}", updated.body);

    let approved = f
        .app
        .request(
            "POST",
            &format!("/api/uploads/{upload_id}/approve"),
            None,
            Some(&f.admin_token),
        )
        .await;
    assert_eq!(approved.status, StatusCode::OK, "{:?}", approved.body);

    let detail = f
        .app
        .request(
            "GET",
            &format!("/api/requirements/{}", f.requirement_id),
            None,
            Some(&f.admin_token),
        )
        .await;
    let statuses: Vec<&str> = detail.body["data"]["assignments"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|a| a["compliance_status"].as_str())
        .collect();
    assert_eq!(statuses, ["PENDING", "PENDING"]);
}

#[tokio::test]
#[ignore = "requires PostgreSQL"]
async fn test_concurrent_pic_updates_sync_cleanly() {
    let f = fixture().await;
    let detail = f
        .app
        .request(
            "GET",
            &format!("/api/requirements/{}", f.requirement_id),
            None,
            Some(&f.admin_token),
        )
        .await;
    let pic_id = detail.body["data"]["assignments"][0]["user_id"].clone();
    let ben = f
        .app
        .create_user("Ben Lim", "ben@example.com", UserRole::Pic)
        .await;

    let path = format!("/api/requirements/{}", f.requirement_id);
    let body = json!({ "pic_ids": [pic_id, ben.id] });
    let (first, second) = tokio::join!(
        f.app
            .request("PUT", &path, Some(body.clone()), Some(&f.admin_token)),
        f.app
            .request("PUT", &path, Some(body.clone()), Some(&f.admin_token)),
    );
    assert_eq!(first.status, StatusCode::OK, "{:?}", first.body);
    assert_eq!(second.status, StatusCode::OK, "{:?}", second.body);
    assert_eq!(
        second.body["data"]["assignments"].as_array().unwrap().len(),
        2
    );
}
