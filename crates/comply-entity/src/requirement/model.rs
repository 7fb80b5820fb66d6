//! Requirement entity model.

use chrono::{DateTime, NaiveDate, Utc};
use comply_core::types::{AgencyId, BranchUnitId, PositionId, RequirementId, UserId};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;

/// A compliance obligation imposed by an agency.
///
/// Positions and branch/unit/departments are stored in join tables and
/// loaded separately; the person-in-charge list is the requirement's
/// set of assignments.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Requirement {
    pub id: RequirementId,
    /// Agency-prefixed code, e.g. `BIR-004`.
    pub req_code: String,
    pub agency_id: AgencyId,
    pub category: String,
    /// Short title of the obligation.
    pub title: String,
    pub description: Option<String>,
    pub frequency: String,
    pub schedule: Option<String>,
    /// Requirements without a deadline are perpetually "N/A".
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to create a requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequirement {
    pub agency_id: AgencyId,
    pub category: String,
    pub title: String,
    pub description: Option<String>,
    pub frequency: String,
    pub schedule: Option<String>,
    pub deadline: Option<NaiveDate>,
    #[serde(default)]
    pub position_ids: Vec<PositionId>,
    #[serde(default)]
    pub branch_unit_ids: Vec<BranchUnitId>,
    #[serde(default)]
    pub pic_ids: Vec<UserId>,
}

/// A partial requirement update. `None` leaves the field unchanged.
///
/// `deadline` distinguishes "not provided" (`None`) from "cleared"
/// (`Some(None)`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRequirement {
    pub agency_id: Option<AgencyId>,
    pub category: Option<String>,
    pub title: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub description: Option<Option<String>>,
    pub frequency: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub schedule: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    pub deadline: Option<Option<NaiveDate>>,
    pub position_ids: Option<Vec<PositionId>>,
    pub branch_unit_ids: Option<Vec<BranchUnitId>>,
    pub pic_ids: Option<Vec<UserId>>,
}

/// A field that is present in the payload, even as `null`, becomes `Some`.
fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_distinguishes_null_from_missing() {
        let cleared: UpdateRequirement =
            serde_json::from_str(r#"{"deadline": null, "title": "ITR"}"#).unwrap();
        assert_eq!(cleared.deadline, Some(None));
        assert_eq!(cleared.description, None);

        let moved: UpdateRequirement = serde_json::from_str(r#"{"deadline": "2030-01-31"}"#).unwrap();
        assert_eq!(moved.deadline, Some(NaiveDate::from_ymd_opt(2030, 1, 31)));
    }
}
