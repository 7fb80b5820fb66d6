//! Header normalisation and column aliases for requirement imports.

use std::collections::HashMap;
use std::fmt;

/// A recognised import column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportColumn {
    AgencyId,
    Requirement,
    ReqId,
    AssignedTo,
    BranchUnit,
    PersonInCharge,
    Frequency,
    Schedule,
    Deadline,
    Description,
    Category,
}

/// Columns that must be present in the header and filled on every row.
pub const REQUIRED_COLUMNS: [ImportColumn; 6] = [
    ImportColumn::AgencyId,
    ImportColumn::Category,
    ImportColumn::Requirement,
    ImportColumn::AssignedTo,
    ImportColumn::BranchUnit,
    ImportColumn::Frequency,
];

impl ImportColumn {
    /// Canonical key used in error messages.
    pub fn key(&self) -> &'static str {
        match self {
            Self::AgencyId => "agency_id",
            Self::Requirement => "requirement",
            Self::ReqId => "req_id",
            Self::AssignedTo => "assigned_to",
            Self::BranchUnit => "branch_unit_department_in_charge",
            Self::PersonInCharge => "person_in_charge",
            Self::Frequency => "frequency",
            Self::Schedule => "schedule",
            Self::Deadline => "deadline",
            Self::Description => "description",
            Self::Category => "category",
        }
    }

    /// Resolve a normalised header to its column.
    pub fn from_alias(normalized: &str) -> Option<Self> {
        let column = match normalized {
            "agency" | "agency_code" | "agency_id" => Self::AgencyId,
            "requirement" | "requirement_name" | "req_name" => Self::Requirement,
            "req_id" => Self::ReqId,
            "assigned_to" | "assignedto" => Self::AssignedTo,
            "branch_unit_department_in_charge"
            | "branch_unit_department"
            | "branch_unit"
            | "department_in_charge" => Self::BranchUnit,
            "person_in_charge" | "person_incharge" => Self::PersonInCharge,
            "frequency" => Self::Frequency,
            "schedule" => Self::Schedule,
            "deadline" => Self::Deadline,
            "description" => Self::Description,
            "category" => Self::Category,
            _ => return None,
        };
        Some(column)
    }
}

impl fmt::Display for ImportColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Lowercase, trim, turn `-`, `/` and spaces into `_`, and collapse `_` runs.
pub fn normalize_header(raw: &str) -> String {
    let lowered = raw.trim().trim_start_matches('\u{feff}').to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        let c = if matches!(c, '-' | '/' | ' ') { '_' } else { c };
        if c == '_' && out.ends_with('_') {
            continue;
        }
        out.push(c);
    }
    out
}

/// Column positions by header. A later duplicate header wins.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    positions: HashMap<ImportColumn, usize>,
}

impl HeaderMap {
    pub fn from_row(header: &[String]) -> Self {
        let mut positions = HashMap::new();
        for (index, raw) in header.iter().enumerate() {
            if let Some(column) = ImportColumn::from_alias(&normalize_header(raw)) {
                positions.insert(column, index);
            }
        }
        Self { positions }
    }

    pub fn contains(&self, column: ImportColumn) -> bool {
        self.positions.contains_key(&column)
    }

    /// First required column absent from the header.
    pub fn first_missing_required(&self) -> Option<ImportColumn> {
        REQUIRED_COLUMNS.into_iter().find(|c| !self.contains(*c))
    }

    /// Trimmed values of one data row keyed by column.
    pub fn map_row(&self, row: &[String]) -> HashMap<ImportColumn, String> {
        self.positions
            .iter()
            .map(|(column, index)| {
                let value = row.get(*index).map(|v| v.trim()).unwrap_or_default();
                (*column, value.to_string())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Branch / Unit - Department "), "branch_unit_department");
        assert_eq!(normalize_header("Person In-Charge"), "person_in_charge");
        assert_eq!(normalize_header("\u{feff}Agency"), "agency");
    }

    #[test]
    fn test_aliases_resolve() {
        assert_eq!(ImportColumn::from_alias("agency_code"), Some(ImportColumn::AgencyId));
        assert_eq!(ImportColumn::from_alias("req_name"), Some(ImportColumn::Requirement));
        assert_eq!(ImportColumn::from_alias("department_in_charge"), Some(ImportColumn::BranchUnit));
        assert_eq!(ImportColumn::from_alias("notes"), None);
    }

    #[test]
    fn test_missing_required_column_reported_in_order() {
        let map = HeaderMap::from_row(&strings(&["Agency", "Requirement", "Frequency"]));
        assert_eq!(map.first_missing_required(), Some(ImportColumn::Category));
    }

    #[test]
    fn test_map_row_trims_and_pads() {
        let map = HeaderMap::from_row(&strings(&["Agency", "Category", "Deadline"]));
        let data = map.map_row(&strings(&[" bir ", "Tax"]));
        assert_eq!(data[&ImportColumn::AgencyId], "bir");
        assert_eq!(data[&ImportColumn::Category], "Tax");
        assert_eq!(data[&ImportColumn::Deadline], "");
    }
}
