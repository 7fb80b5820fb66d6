//! Plain-text bodies for compliance emails.

use chrono::NaiveDate;

/// Fields shared by every requirement email.
#[derive(Debug, Clone)]
pub struct RequirementMailFields<'a> {
    pub recipient_name: &'a str,
    pub req_code: &'a str,
    pub title: &'a str,
    pub agency_name: &'a str,
    pub deadline: Option<NaiveDate>,
}

fn deadline_text(deadline: Option<NaiveDate>) -> String {
    deadline
        .map(|d| d.format("%B %-d, %Y").to_string())
        .unwrap_or_else(|| "Not set".to_string())
}

fn header(fields: &RequirementMailFields<'_>) -> String {
    format!(
        "Requirement: {} - {}\nAgency: {}\nDeadline: {}",
        fields.req_code,
        fields.title,
        fields.agency_name,
        deadline_text(fields.deadline)
    )
}

pub fn assigned(fields: &RequirementMailFields<'_>, app_url: &str) -> (String, String) {
    (
        format!("[Compliance] New requirement assigned: {}", fields.req_code),
        format!(
            "Hello {},\n\nYou have been assigned as person-in-charge of a compliance requirement.\n\n{}\n\nView your requirements at {}/requirements/my\n",
            fields.recipient_name,
            header(fields),
            app_url
        ),
    )
}

pub fn deadline_updated(fields: &RequirementMailFields<'_>, app_url: &str) -> (String, String) {
    (
        format!("[Compliance] Deadline updated: {}", fields.req_code),
        format!(
            "Hello {},\n\nThe deadline of a requirement assigned to you has changed. Previous submissions no longer count toward the new cycle.\n\n{}\n\nView your requirements at {}/requirements/my\n",
            fields.recipient_name,
            header(fields),
            app_url
        ),
    )
}

pub fn reminder(
    fields: &RequirementMailFields<'_>,
    days_left: i64,
    status: &str,
    app_url: &str,
) -> (String, String) {
    let when = if days_left == 1 {
        "tomorrow".to_string()
    } else {
        format!("in {days_left} days")
    };
    (
        format!("[Compliance] Reminder: {} is due {}", fields.req_code, when),
        format!(
            "Hello {},\n\nThis is a reminder that a requirement assigned to you is due {}.\n\n{}\nCurrent status: {}\n\nUpload your proof of compliance at {}/requirements/my\n",
            fields.recipient_name,
            when,
            header(fields),
            status,
            app_url
        ),
    )
}

pub fn submitted_for_review(
    fields: &RequirementMailFields<'_>,
    uploader_name: &str,
    file_name: &str,
    app_url: &str,
) -> (String, String) {
    (
        format!("[Compliance] Submission pending review: {}", fields.req_code),
        format!(
            "Hello {},\n\n{} uploaded \"{}\" for review.\n\n{}\n\nReview it at {}/uploads\n",
            fields.recipient_name,
            uploader_name,
            file_name,
            header(fields),
            app_url
        ),
    )
}

pub fn reviewed(
    fields: &RequirementMailFields<'_>,
    file_name: &str,
    approved: bool,
    remarks: Option<&str>,
    app_url: &str,
) -> (String, String) {
    let outcome = if approved { "approved" } else { "rejected" };
    let remarks = remarks
        .filter(|r| !r.trim().is_empty())
        .map(|r| format!("\nRemarks: {r}"))
        .unwrap_or_default();
    (
        format!("[Compliance] Submission {}: {}", outcome, fields.req_code),
        format!(
            "Hello {},\n\nYour upload \"{}\" has been {}.{}\n\n{}\n\nView it at {}/uploads\n",
            fields.recipient_name,
            file_name,
            outcome,
            remarks,
            header(fields),
            app_url
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> RequirementMailFields<'static> {
        RequirementMailFields {
            recipient_name: "Ana Cruz",
            req_code: "BIR-004",
            title: "Annual ITR",
            agency_name: "Bureau of Internal Revenue",
            deadline: NaiveDate::from_ymd_opt(2026, 4, 15),
        }
    }

    #[test]
    fn test_reminder_wording() {
        let (subject, body) = reminder(&fields(), 1, "SUBMITTED", "https://app");
        assert_eq!(subject, "[Compliance] Reminder: BIR-004 is due tomorrow");
        assert!(body.contains("Deadline: April 15, 2026"));
        assert!(body.contains("Current status: SUBMITTED"));

        let (subject, _) = reminder(&fields(), 14, "PENDING", "https://app");
        assert!(subject.ends_with("in 14 days"));
    }

    #[test]
    fn test_reviewed_includes_remarks_only_when_present() {
        let (_, body) = reviewed(&fields(), "itr.pdf", false, Some("Unsigned"), "https://app");
        assert!(body.contains("has been rejected.\nRemarks: Unsigned"));
        let (subject, body) = reviewed(&fields(), "itr.pdf", true, Some("  "), "https://app");
        assert!(subject.contains("approved"));
        assert!(!body.contains("Remarks"));
    }
}
