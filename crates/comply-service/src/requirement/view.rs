//! Read models returned by the requirement endpoints.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use comply_core::types::RequirementId;
use comply_database::repositories::{AssignmentWithUser, RequirementRow, UploadRow};
use comply_entity::assignment::{ComplianceStatus, RequirementAssignment};

use crate::compliance::{effective_status, summarize_requirement};

/// A linked reference row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedRef {
    pub id: Uuid,
    pub name: String,
}

/// One row of the requirement list.
#[derive(Debug, Clone, Serialize)]
pub struct RequirementListItem {
    #[serde(flatten)]
    pub requirement: RequirementRow,
    pub positions: Vec<NamedRef>,
    pub branch_unit_departments: Vec<NamedRef>,
    pub assignments: Vec<AssignmentWithUser>,
    /// Aggregate such as `Pending (67%)`.
    pub compliance_status: String,
}

/// An assignment with its PIC and uploads.
#[derive(Debug, Clone, Serialize)]
pub struct AssignmentDetail {
    #[serde(flatten)]
    pub assignment: AssignmentWithUser,
    pub uploads: Vec<UploadRow>,
}

/// The requirement detail page.
#[derive(Debug, Clone, Serialize)]
pub struct RequirementDetail {
    #[serde(flatten)]
    pub requirement: RequirementRow,
    pub positions: Vec<NamedRef>,
    pub branch_unit_departments: Vec<NamedRef>,
    pub assignments: Vec<AssignmentDetail>,
    pub compliance_status: String,
}

/// A requirement as seen by one of its PICs.
#[derive(Debug, Clone, Serialize)]
pub struct MyRequirement {
    #[serde(flatten)]
    pub requirement: RequirementRow,
    pub assignment: Option<RequirementAssignment>,
    /// The caller's own status, PENDING when there is no assignment.
    pub compliance_status: ComplianceStatus,
}

/// Group `(requirement, id, name)` link rows by requirement.
pub(crate) fn group_links<I: Into<Uuid>>(
    links: Vec<(RequirementId, I, String)>,
) -> HashMap<RequirementId, Vec<NamedRef>> {
    let mut grouped: HashMap<RequirementId, Vec<NamedRef>> = HashMap::new();
    for (requirement_id, id, name) in links {
        grouped.entry(requirement_id).or_default().push(NamedRef {
            id: id.into(),
            name,
        });
    }
    grouped
}

/// Group assignments by requirement.
pub(crate) fn group_assignments(
    assignments: Vec<AssignmentWithUser>,
) -> HashMap<RequirementId, Vec<AssignmentWithUser>> {
    let mut grouped: HashMap<RequirementId, Vec<AssignmentWithUser>> = HashMap::new();
    for item in assignments {
        grouped
            .entry(item.assignment.requirement_id)
            .or_default()
            .push(item);
    }
    grouped
}

/// Statuses of a set of assignments.
pub(crate) fn statuses(assignments: &[AssignmentWithUser]) -> Vec<ComplianceStatus> {
    assignments
        .iter()
        .map(|a| a.assignment.compliance_status)
        .collect()
}

/// Aggregate label of a requirement row and its assignments as of `today`.
pub(crate) fn overall_status(
    row: &RequirementRow,
    assignments: &[AssignmentWithUser],
    today: NaiveDate,
) -> String {
    let statuses: Vec<ComplianceStatus> = assignments
        .iter()
        .map(|a| effective_status(a.assignment.compliance_status, a.assignment.deadline, today))
        .collect();
    summarize_requirement(row.requirement.deadline, &statuses)
}
