//! Position and branch/unit/department models.

use chrono::{DateTime, Utc};
use comply_core::types::{BranchUnitId, PositionId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::audit::EntityType;

/// A job position that may be responsible for a requirement.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Position {
    pub id: PositionId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A branch, unit or department in charge of a requirement.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BranchUnitDepartment {
    pub id: BranchUnitId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The two name-only reference tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Position,
    BranchUnit,
}

impl ReferenceKind {
    /// Backing table name.
    pub fn table(&self) -> &'static str {
        match self {
            Self::Position => "positions",
            Self::BranchUnit => "branch_unit_departments",
        }
    }

    /// Entity type recorded in the audit log.
    pub fn entity_type(&self) -> EntityType {
        match self {
            Self::Position => EntityType::Position,
            Self::BranchUnit => EntityType::BranchUnitDepartment,
        }
    }

    /// Singular label used in messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Position => "Position",
            Self::BranchUnit => "Branch/unit/department",
        }
    }
}
