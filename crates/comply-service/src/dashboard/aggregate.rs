//! Pure dashboard computations over loaded requirement rows.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::Serialize;

use comply_core::types::{RequirementId, UserId};
use comply_database::repositories::{AssignmentWithUser, RequirementRow};

use crate::compliance::{
    CalendarStatus, StatusBucket, admin_calendar_status, requirement_bucket, user_calendar_status,
};
use crate::requirement::view::statuses;

/// Headline counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_agencies: i64,
    pub total_requirements: i64,
    pub compliant: i64,
    pub pending: i64,
    pub overdue: i64,
    pub for_approval: i64,
    /// Percentage of requirements complied, one decimal.
    pub compliance_rate: f64,
}

/// Bucket counts of one agency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgencyStats {
    /// Agency code.
    pub agency: String,
    pub name: String,
    pub total: u32,
    pub na: u32,
    pub pending: u32,
    pub overdue: u32,
    pub complied: u32,
}

/// One requirement on the deadline calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEntry {
    pub id: RequirementId,
    pub name: String,
    pub status: CalendarStatus,
    /// PIC names joined with `, `.
    pub pic: String,
}

/// `(requirement, uploader, deadline snapshot)` of a PENDING upload.
pub type PendingCycle = (RequirementId, UserId, Option<NaiveDate>);

fn assignments_of<'a>(
    assignments: &'a HashMap<RequirementId, Vec<AssignmentWithUser>>,
    id: RequirementId,
) -> &'a [AssignmentWithUser] {
    assignments.get(&id).map(Vec::as_slice).unwrap_or_default()
}

/// Round to one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn compute_stats(
    rows: &[RequirementRow],
    assignments: &HashMap<RequirementId, Vec<AssignmentWithUser>>,
    total_agencies: i64,
    for_approval: i64,
) -> DashboardStats {
    let (mut compliant, mut pending, mut overdue) = (0i64, 0i64, 0i64);
    for row in rows {
        let list = assignments_of(assignments, row.requirement.id);
        match requirement_bucket(row.requirement.deadline, &statuses(list)) {
            StatusBucket::Complied => compliant += 1,
            StatusBucket::Pending => pending += 1,
            StatusBucket::Overdue => overdue += 1,
            StatusBucket::Na => {}
        }
    }
    let total_requirements = rows.len() as i64;
    let compliance_rate = if total_requirements > 0 {
        round1(compliant as f64 / total_requirements as f64 * 100.0)
    } else {
        0.0
    };

    DashboardStats {
        total_agencies,
        total_requirements,
        compliant,
        pending,
        overdue,
        for_approval,
        compliance_rate,
    }
}

/// Per-agency bucket counts, in the order agencies first appear. Agencies
/// with nothing to count are left out.
pub fn agency_stats(
    rows: &[RequirementRow],
    assignments: &HashMap<RequirementId, Vec<AssignmentWithUser>>,
) -> Vec<AgencyStats> {
    let mut order: Vec<String> = Vec::new();
    let mut by_agency: HashMap<String, AgencyStats> = HashMap::new();

    for row in rows {
        let entry = by_agency.entry(row.agency_code.clone()).or_insert_with(|| {
            order.push(row.agency_code.clone());
            AgencyStats {
                agency: row.agency_code.clone(),
                name: row.agency_name.clone(),
                total: 0,
                na: 0,
                pending: 0,
                overdue: 0,
                complied: 0,
            }
        });
        let list = assignments_of(assignments, row.requirement.id);
        match requirement_bucket(row.requirement.deadline, &statuses(list)) {
            StatusBucket::Na => entry.na += 1,
            StatusBucket::Pending => entry.pending += 1,
            StatusBucket::Overdue => entry.overdue += 1,
            StatusBucket::Complied => entry.complied += 1,
        }
        entry.total += 1;
    }

    order
        .into_iter()
        .filter_map(|code| by_agency.remove(&code))
        .filter(|stats| stats.total > 0)
        .collect()
}

/// Requirements with a deadline grouped by `YYYY-MM-DD`.
///
/// `viewer` selects the PIC view for that user; `None` is the admin view.
pub fn calendar(
    rows: &[RequirementRow],
    assignments: &HashMap<RequirementId, Vec<AssignmentWithUser>>,
    pending: &[PendingCycle],
    viewer: Option<UserId>,
) -> BTreeMap<String, Vec<CalendarEntry>> {
    let pending_any: HashSet<(RequirementId, Option<NaiveDate>)> =
        pending.iter().map(|(r, _, d)| (*r, *d)).collect();
    let pending_own: HashSet<(RequirementId, UserId, Option<NaiveDate>)> =
        pending.iter().copied().collect();

    let mut by_date: BTreeMap<String, Vec<CalendarEntry>> = BTreeMap::new();
    for row in rows {
        let Some(deadline) = row.requirement.deadline else {
            continue;
        };
        let id = row.requirement.id;
        let list = assignments_of(assignments, id);

        let status = match viewer {
            Some(user_id) => {
                let own = list
                    .iter()
                    .find(|a| a.assignment.user_id == user_id)
                    .map(|a| a.assignment.compliance_status);
                let own_pending = pending_own.contains(&(id, user_id, Some(deadline)));
                user_calendar_status(Some(deadline), own, own_pending)
            }
            None => {
                let any_pending = pending_any.contains(&(id, Some(deadline)));
                admin_calendar_status(Some(deadline), &statuses(list), any_pending)
            }
        };

        let mut names: Vec<&str> = Vec::new();
        for name in list.iter().filter_map(|a| a.employee_name.as_deref()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }

        by_date
            .entry(deadline.format("%Y-%m-%d").to_string())
            .or_default()
            .push(CalendarEntry {
                id,
                name: row.requirement.title.clone(),
                status,
                pic: names.join(", "),
            });
    }
    by_date
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use comply_core::types::{AgencyId, AssignmentId};
    use comply_entity::assignment::{ComplianceStatus, RequirementAssignment};
    use comply_entity::requirement::Requirement;

    fn row(agency: &str, title: &str, deadline: Option<NaiveDate>) -> RequirementRow {
        RequirementRow {
            requirement: Requirement {
                id: RequirementId::new(),
                req_code: format!("{agency}-001"),
                agency_id: AgencyId::new(),
                category: "General".to_string(),
                title: title.to_string(),
                description: None,
                frequency: "Annual".to_string(),
                schedule: None,
                deadline,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            agency_code: agency.to_string(),
            agency_name: format!("{agency} office"),
        }
    }

    fn assign(
        map: &mut HashMap<RequirementId, Vec<AssignmentWithUser>>,
        row: &RequirementRow,
        user_id: UserId,
        name: &str,
        status: ComplianceStatus,
    ) {
        map.entry(row.requirement.id).or_default().push(AssignmentWithUser {
            assignment: RequirementAssignment {
                id: AssignmentId::new(),
                assignment_code: "ASGN-0000000000".to_string(),
                requirement_id: row.requirement.id,
                user_id,
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
        });
    }

    fn date() -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(2026, 11, 30)
    }

    #[test]
    fn test_stats_buckets_and_rate() {
        let done = row("BIR", "ITR", date());
        let late = row("BIR", "VAT", date());
        let open = row("SEC", "GIS", date());
        let none = row("SEC", "Permit", None);
        let mut map = HashMap::new();
        assign(&mut map, &done, UserId::new(), "Ana", ComplianceStatus::Approved);
        assign(&mut map, &late, UserId::new(), "Ben", ComplianceStatus::Overdue);
        assign(&mut map, &late, UserId::new(), "Cy", ComplianceStatus::Approved);

        let stats = compute_stats(&[done, late, open, none], &map, 2, 5);
        assert_eq!(stats.compliant, 1);
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.total_requirements, 4);
        assert_eq!(stats.for_approval, 5);
        assert_eq!(stats.compliance_rate, 25.0);
    }

    #[test]
    fn test_rate_rounds_to_one_decimal() {
        let rows: Vec<_> = (0..3).map(|_| row("BIR", "x", date())).collect();
        let mut map = HashMap::new();
        assign(&mut map, &rows[0], UserId::new(), "Ana", ComplianceStatus::Approved);
        assert_eq!(compute_stats(&rows, &map, 1, 0).compliance_rate, 33.3);
        assert_eq!(compute_stats(&[], &map, 0, 0).compliance_rate, 0.0);
    }

    #[test]
    fn test_agency_stats_per_agency() {
        let a = row("BIR", "ITR", date());
        let b = row("SEC", "GIS", None);
        let c = row("BIR", "VAT", date());
        let mut map = HashMap::new();
        assign(&mut map, &a, UserId::new(), "Ana", ComplianceStatus::Approved);

        let stats = agency_stats(&[a, b, c], &map);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].agency, "BIR");
        assert_eq!((stats[0].total, stats[0].complied, stats[0].pending), (2, 1, 1));
        assert_eq!((stats[1].agency.as_str(), stats[1].na), ("SEC", 1));
    }

    #[test]
    fn test_calendar_admin_and_pic_views() {
        let r = row("BIR", "ITR", date());
        let ana = UserId::new();
        let ben = UserId::new();
        let mut map = HashMap::new();
        assign(&mut map, &r, ana, "Ana", ComplianceStatus::Submitted);
        assign(&mut map, &r, ben, "Ben", ComplianceStatus::Pending);
        let pending = vec![(r.requirement.id, ana, date())];
        let rows = [r, row("SEC", "Permit", None)];

        let admin = calendar(&rows, &map, &pending, None);
        assert_eq!(admin.len(), 1);
        let entry = &admin["2026-11-30"][0];
        assert_eq!(entry.status, CalendarStatus::ForApproval);
        assert_eq!(entry.pic, "Ana, Ben");

        let as_ben = calendar(&rows, &map, &pending, Some(ben));
        assert_eq!(as_ben["2026-11-30"][0].status, CalendarStatus::Pending);
        let as_ana = calendar(&rows, &map, &pending, Some(ana));
        assert_eq!(as_ana["2026-11-30"][0].status, CalendarStatus::ForApproval);
    }
}
