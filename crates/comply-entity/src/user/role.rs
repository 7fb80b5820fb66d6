//! User role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles available to compliance tracker accounts.
///
/// Both `SuperAdmin` and `AdminSpecialist` count as administrators for
/// requirement and upload review; only `SuperAdmin` manages accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    /// Full system administrator.
    SuperAdmin,
    /// Compliance & admin specialist: manages requirements and reviews uploads.
    AdminSpecialist,
    /// Person-in-charge: fulfils assigned requirements.
    Pic,
}

impl UserRole {
    /// Whether this role may manage requirements and review uploads.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin | Self::AdminSpecialist)
    }

    /// Whether this role may manage user accounts, imports, and the audit trail.
    pub fn is_super_admin(&self) -> bool {
        matches!(self, Self::SuperAdmin)
    }

    /// Return the role as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "super_admin",
            Self::AdminSpecialist => "admin_specialist",
            Self::Pic => "pic",
        }
    }

    /// Human-readable label shown in emails and exports.
    pub fn label(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "Super Admin",
            Self::AdminSpecialist => "Compliance & Admin Specialist",
            Self::Pic => "Person-In-Charge (PIC)",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = comply_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "superadmin" => Ok(Self::SuperAdmin),
            "adminspecialist" | "complianceadminspecialist" | "specialist" => {
                Ok(Self::AdminSpecialist)
            }
            "pic" | "personincharge" | "personinchargepic" => Ok(Self::Pic),
            _ => Err(comply_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: super_admin, admin_specialist, pic"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_roles() {
        assert!(UserRole::SuperAdmin.is_admin());
        assert!(UserRole::AdminSpecialist.is_admin());
        assert!(!UserRole::Pic.is_admin());
        assert!(!UserRole::AdminSpecialist.is_super_admin());
    }

    #[test]
    fn test_from_str_accepts_labels() {
        assert_eq!("super_admin".parse::<UserRole>().unwrap(), UserRole::SuperAdmin);
        assert_eq!("Super Admin".parse::<UserRole>().unwrap(), UserRole::SuperAdmin);
        assert_eq!(
            "Compliance & Admin Specialist".parse::<UserRole>().unwrap(),
            UserRole::AdminSpecialist
        );
        assert_eq!("Person-in-Charge".parse::<UserRole>().unwrap(), UserRole::Pic);
        assert!("auditor".parse::<UserRole>().is_err());
    }
}
