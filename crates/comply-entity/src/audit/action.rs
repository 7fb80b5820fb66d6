//! Audit actions and audited entity types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// An action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
    Login,
    Logout,
    ResetPassword,
    ResetPasswordAdmin,
    Approved,
    Rejected,
    Imported,
}

impl AuditAction {
    /// Return the action as stored in the `action` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Updated => "UPDATED",
            Self::Deleted => "DELETED",
            Self::Login => "LOGIN",
            Self::Logout => "LOGOUT",
            Self::ResetPassword => "RESET_PASSWORD",
            Self::ResetPasswordAdmin => "RESET_PASSWORD_ADMIN",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Imported => "IMPORTED",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of record an audit entry refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    User,
    Agency,
    Position,
    BranchUnitDepartment,
    Requirement,
    Assignment,
    Upload,
}

impl EntityType {
    /// Return the entity type as stored in the `entity_type` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Agency => "agency",
            Self::Position => "position",
            Self::BranchUnitDepartment => "branch_unit_department",
            Self::Requirement => "requirement",
            Self::Assignment => "assignment",
            Self::Upload => "upload",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
