//! Agency entity model.

use chrono::{DateTime, Utc};
use comply_core::types::AgencyId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// An external regulatory body that imposes requirements.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Agency {
    pub id: AgencyId,
    /// Unique uppercase code, also the prefix of its requirement codes.
    pub code: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data required to create an agency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAgency {
    pub code: String,
    pub name: String,
}

/// Agency fields that may change after creation. The code is immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateAgency {
    pub name: String,
}

/// Canonical form of an agency code: trimmed and uppercased.
pub fn normalize_agency_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_agency_code() {
        assert_eq!(normalize_agency_code("  bir "), "BIR");
        assert_eq!(normalize_agency_code("Sec-Ph"), "SEC-PH");
    }
}
