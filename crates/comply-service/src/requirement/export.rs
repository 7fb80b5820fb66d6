//! CSV export of the requirement register.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;

use comply_core::types::RequirementId;
use comply_database::repositories::{AssignmentWithUser, RequirementRow};

use super::view::overall_status;

/// Column headers of the export, in order.
pub const EXPORT_HEADERS: [&str; 11] = [
    "Req ID",
    "Agency ID",
    "Agency",
    "Category",
    "Requirement",
    "Description",
    "Frequency",
    "Schedule",
    "Deadline",
    "Overall Status",
    "Assigned People",
];

/// A rendered export ready for download.
#[derive(Debug, Clone, Serialize)]
pub struct CsvExport {
    pub file_name: String,
    pub content: String,
}

/// `requirements_export_YYYYMMDD.csv`
pub fn export_file_name(today: NaiveDate) -> String {
    format!("requirements_export_{}.csv", today.format("%Y%m%d"))
}

/// Render rows as RFC 4180 CSV with CRLF line endings.
pub fn render_export(
    rows: &[RequirementRow],
    assignments: &HashMap<RequirementId, Vec<AssignmentWithUser>>,
    today: NaiveDate,
) -> String {
    let mut out = String::new();
    push_record(&mut out, EXPORT_HEADERS.iter().copied());

    for row in rows {
        let requirement = &row.requirement;
        let people = assignments
            .get(&requirement.id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let names = people
            .iter()
            .filter_map(|a| a.employee_name.as_deref())
            .collect::<Vec<_>>()
            .join("; ");
        let deadline = requirement
            .deadline
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let status = overall_status(row, people, today);

        push_record(
            &mut out,
            [
                requirement.req_code.as_str(),
                row.agency_code.as_str(),
                row.agency_name.as_str(),
                requirement.category.as_str(),
                requirement.title.as_str(),
                requirement.description.as_deref().unwrap_or(""),
                requirement.frequency.as_str(),
                requirement.schedule.as_deref().unwrap_or(""),
                deadline.as_str(),
                status.as_str(),
                names.as_str(),
            ],
        );
    }
    out
}

fn push_record<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push_str("\r\n");
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\n', '\r']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use comply_core::types::{AgencyId, AssignmentId, UserId};
    use comply_entity::assignment::{ComplianceStatus, RequirementAssignment};
    use comply_entity::requirement::Requirement;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    fn row(deadline: Option<NaiveDate>) -> RequirementRow {
        RequirementRow {
            requirement: Requirement {
                id: RequirementId::new(),
                req_code: "BIR-001".to_string(),
                agency_id: AgencyId::new(),
                category: "Tax".to_string(),
                title: "Annual ITR".to_string(),
                description: Some("File, then \"pay\"".to_string()),
                frequency: "Annual".to_string(),
                schedule: None,
                deadline,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            agency_code: "BIR".to_string(),
            agency_name: "Bureau of Internal Revenue".to_string(),
        }
    }

    fn assignment(row: &RequirementRow, name: &str, status: ComplianceStatus) -> AssignmentWithUser {
        AssignmentWithUser {
            assignment: RequirementAssignment {
                id: AssignmentId::new(),
                assignment_code: "ASGN-ABCDEFGHIJ".to_string(),
                requirement_id: row.requirement.id,
                user_id: UserId::new(),
                deadline: row.requirement.deadline,
                compliance_status: status,
                last_submitted_at: None,
                last_approved_at: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            user_code: None,
            employee_name: Some(name.to_string()),
            email: None,
        }
    }

    #[test]
    fn test_file_name_uses_compact_date() {
        let day = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        assert_eq!(export_file_name(day), "requirements_export_20260309.csv");
    }

    #[test]
    fn test_render_quotes_and_joins_people() {
        let row = row(NaiveDate::from_ymd_opt(2030, 4, 15));
        let mut map = HashMap::new();
        map.insert(
            row.requirement.id,
            vec![
                assignment(&row, "Ana Cruz", ComplianceStatus::Approved),
                assignment(&row, "Ben Lim", ComplianceStatus::Pending),
            ],
        );

        let csv = render_export(std::slice::from_ref(&row), &map, today());
        let lines: Vec<&str> = csv.split("\r\n").collect();
        assert_eq!(lines[0], EXPORT_HEADERS.join(","));
        assert_eq!(
            lines[1],
            "BIR-001,BIR,Bureau of Internal Revenue,Tax,Annual ITR,\"File, then \"\"pay\"\"\",Annual,,2030-04-15,Pending (50%),Ana Cruz; Ben Lim"
        );
    }

    #[test]
    fn test_render_marks_lapsed_unsubmitted_requirement_late() {
        let row = row(NaiveDate::from_ymd_opt(2020, 1, 1));
        let mut map = HashMap::new();
        map.insert(
            row.requirement.id,
            vec![assignment(&row, "Ana Cruz", ComplianceStatus::Pending)],
        );
        let csv = render_export(std::slice::from_ref(&row), &map, today());
        assert!(csv.lines().nth(1).unwrap().ends_with(",2020-01-01,Late (100%),Ana Cruz"));
    }

    #[test]
    fn test_render_without_deadline_is_na() {
        let row = row(None);
        let csv = render_export(std::slice::from_ref(&row), &HashMap::new(), today());
        assert!(csv.lines().nth(1).unwrap().ends_with(",,N/A,"));
    }
}
