//! Best-effort compliance notifications.
//!
//! Every send failure is logged with its context and swallowed; callers
//! never fail because mail could not be delivered.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{error, warn};

use comply_database::repositories::{AssignmentWithUser, RequirementRow};
use comply_entity::assignment::ComplianceStatus;
use comply_entity::upload::{ApprovalStatus, Upload};
use comply_entity::user::User;

use super::mailer::{MailError, Mailer, OutgoingMail};
use super::templates::{self, RequirementMailFields};

/// Why an assignee is being told about a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeContext {
    /// A new assignment was created.
    Assigned,
    /// The requirement deadline moved.
    Updated,
}

impl NoticeContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Assigned => "assigned",
            Self::Updated => "updated",
        }
    }
}

/// Whether an assignee should receive a requirement notice.
///
/// Approved assignments are never notified. Without a deadline, only the
/// initial assignment notice goes out.
pub fn should_notify(
    context: NoticeContext,
    deadline: Option<NaiveDate>,
    status: ComplianceStatus,
) -> bool {
    if deadline.is_none() && context != NoticeContext::Assigned {
        return false;
    }
    status != ComplianceStatus::Approved
}

/// Sends requirement, review, and reminder emails.
#[derive(Debug, Clone)]
pub struct ComplianceNotifier {
    mailer: Arc<dyn Mailer>,
    app_url: String,
}

impl ComplianceNotifier {
    pub fn new(mailer: Arc<dyn Mailer>, app_url: impl Into<String>) -> Self {
        Self {
            mailer,
            app_url: app_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn app_url(&self) -> &str {
        &self.app_url
    }

    /// Deliver one message.
    pub async fn deliver(&self, mail: &OutgoingMail) -> Result<(), MailError> {
        self.mailer.send(mail).await
    }

    /// Tell each assignee that they were assigned or that the deadline moved.
    pub async fn notify_assignments(
        &self,
        requirement: &RequirementRow,
        assignments: &[AssignmentWithUser],
        context: NoticeContext,
    ) {
        for item in assignments {
            let assignment = &item.assignment;
            if !should_notify(context, assignment.deadline, assignment.compliance_status) {
                continue;
            }
            let Some(email) = item.email.as_deref().filter(|e| !e.trim().is_empty()) else {
                continue;
            };

            let fields = RequirementMailFields {
                recipient_name: item.employee_name.as_deref().unwrap_or("there"),
                req_code: &requirement.requirement.req_code,
                title: &requirement.requirement.title,
                agency_name: &requirement.agency_name,
                deadline: assignment.deadline,
            };
            let (subject, body) = match context {
                NoticeContext::Assigned => templates::assigned(&fields, &self.app_url),
                NoticeContext::Updated => templates::deadline_updated(&fields, &self.app_url),
            };
            let mail = OutgoingMail {
                to: email.to_string(),
                subject,
                body,
            };

            if let Err(e) = self.mailer.send(&mail).await {
                error!(
                    assignment_id = %assignment.id,
                    email = %email,
                    context = context.as_str(),
                    error = %e,
                    "Failed to send requirement deadline email"
                );
            }
        }
    }

    /// Ask every active admin to review a new pending upload.
    pub async fn notify_submitted(
        &self,
        admins: &[User],
        requirement: &RequirementRow,
        upload: &Upload,
        uploader_name: &str,
    ) {
        for admin in admins {
            if admin.email.trim().is_empty() {
                continue;
            }
            let fields = RequirementMailFields {
                recipient_name: &admin.employee_name,
                req_code: &requirement.requirement.req_code,
                title: &requirement.requirement.title,
                agency_name: &requirement.agency_name,
                deadline: upload.deadline_at_upload,
            };
            let (subject, body) = templates::submitted_for_review(
                &fields,
                uploader_name,
                &upload.original_name,
                &self.app_url,
            );
            let mail = OutgoingMail {
                to: admin.email.clone(),
                subject,
                body,
            };
            if let Err(e) = self.mailer.send(&mail).await {
                error!(
                    upload_id = %upload.id,
                    email = %admin.email,
                    context = "submitted",
                    error = %e,
                    "Failed to send pending review email"
                );
            }
        }
    }

    /// Tell the submitter how their upload was reviewed.
    pub async fn notify_reviewed(
        &self,
        requirement: &RequirementRow,
        upload: &Upload,
        uploader_name: &str,
    ) {
        let Some(email) = upload
            .uploader_email
            .as_deref()
            .filter(|e| !e.trim().is_empty())
        else {
            warn!(upload_id = %upload.id, "Review email skipped: uploader has no email");
            return;
        };

        let fields = RequirementMailFields {
            recipient_name: uploader_name,
            req_code: &requirement.requirement.req_code,
            title: &requirement.requirement.title,
            agency_name: &requirement.agency_name,
            deadline: upload.deadline_at_upload,
        };
        let (subject, body) = templates::reviewed(
            &fields,
            &upload.original_name,
            upload.approval_status == ApprovalStatus::Approved,
            upload.admin_remarks.as_deref(),
            &self.app_url,
        );
        let mail = OutgoingMail {
            to: email.to_string(),
            subject,
            body,
        };
        if let Err(e) = self.mailer.send(&mail).await {
            error!(
                upload_id = %upload.id,
                email = %email,
                context = "reviewed",
                error = %e,
                "Failed to send submission status email"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ComplianceStatus::*;

    #[test]
    fn test_should_notify_rules() {
        let deadline = NaiveDate::from_ymd_opt(2026, 5, 1);
        assert!(should_notify(NoticeContext::Assigned, None, Pending));
        assert!(!should_notify(NoticeContext::Updated, None, Pending));
        assert!(should_notify(NoticeContext::Updated, deadline, Submitted));
        assert!(!should_notify(NoticeContext::Assigned, deadline, Approved));
    }
}
