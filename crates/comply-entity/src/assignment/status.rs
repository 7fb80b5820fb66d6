//! Assignment compliance status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fulfilment state of one assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "compliance_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceStatus {
    /// Awaiting a submission (also the state after a rejection).
    Pending,
    /// A document is waiting for review.
    Submitted,
    /// The current cycle is fulfilled.
    Approved,
    /// An admin recorded a rejected upload directly.
    Rejected,
    /// The deadline passed without a submission.
    Overdue,
}

impl ComplianceStatus {
    /// Return the status as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Submitted => "SUBMITTED",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Overdue => "OVERDUE",
        }
    }
}

impl fmt::Display for ComplianceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ComplianceStatus {
    type Err = comply_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Ok(Self::Pending),
            "SUBMITTED" => Ok(Self::Submitted),
            "APPROVED" => Ok(Self::Approved),
            "REJECTED" => Ok(Self::Rejected),
            "OVERDUE" => Ok(Self::Overdue),
            _ => Err(comply_core::AppError::validation(format!(
                "Invalid compliance status: '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_str() {
        for status in [
            ComplianceStatus::Pending,
            ComplianceStatus::Submitted,
            ComplianceStatus::Approved,
            ComplianceStatus::Rejected,
            ComplianceStatus::Overdue,
        ] {
            assert_eq!(status.as_str().parse::<ComplianceStatus>().unwrap(), status);
        }
        assert_eq!("approved".parse::<ComplianceStatus>().unwrap(), ComplianceStatus::Approved);
    }

    #[test]
    fn test_serde_uses_uppercase() {
        let json = serde_json::to_string(&ComplianceStatus::Submitted).unwrap();
        assert_eq!(json, "\"SUBMITTED\"");
    }
}
