//! Bulk requirement import from CSV or XLSX.
//!
//! Rows are processed independently: a bad row is reported with its
//! spreadsheet row number and the rest of the file still imports.

pub mod csv;
pub mod headers;
pub mod xlsx;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use comply_core::error::AppError;
use comply_core::result::AppResult;
use comply_core::types::{BranchUnitId, PositionId, UserId};
use comply_database::repositories::{AgencyRepository, UserRepository};
use comply_entity::agency::Agency;
use comply_entity::audit::{AuditAction, EntityType};

use self::headers::{HeaderMap, ImportColumn, REQUIRED_COLUMNS};
use super::service::{NewRequirement, RequirementService};
use crate::audit::AuditRecorder;
use crate::context::RequestContext;

/// One rejected data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRowError {
    /// Spreadsheet row number; the header is row 1.
    pub row: usize,
    pub message: String,
}

/// Outcome of an import.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub created: usize,
    pub errors: Vec<ImportRowError>,
}

/// Accepted upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    Csv,
    Xlsx,
}

impl ImportFormat {
    /// Detect the format from the uploaded file name.
    pub fn from_file_name(name: &str) -> AppResult<Self> {
        let extension = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "xlsx" => Ok(Self::Xlsx),
            _ => Err(AppError::validation(
                "The file field must be a file of type: csv, xlsx.",
            )),
        }
    }
}

/// Parse an uploaded file into raw rows.
pub fn read_rows(format: ImportFormat, bytes: &[u8]) -> AppResult<Vec<Vec<String>>> {
    match format {
        ImportFormat::Csv => Ok(csv::parse_csv(&String::from_utf8_lossy(bytes))),
        ImportFormat::Xlsx => Ok(xlsx::parse_xlsx(bytes)?),
    }
}

/// Name lookups loaded once per import.
#[derive(Debug, Default)]
pub(crate) struct ImportLookup {
    /// Agencies by uppercase code.
    pub agencies: HashMap<String, Agency>,
    /// Position ids by lowercase name.
    pub positions: HashMap<String, Uuid>,
    /// Branch/unit/department ids by lowercase name.
    pub branch_units: HashMap<String, Uuid>,
    /// User ids by lowercase employee name and lowercase user code.
    pub users: HashMap<String, Vec<UserId>>,
}

/// A data row resolved against the lookups.
pub(crate) fn plan_row(
    data: &HashMap<ImportColumn, String>,
    lookup: &ImportLookup,
) -> Result<NewRequirement, String> {
    let value = |column: ImportColumn| data.get(&column).map(String::as_str).unwrap_or("");

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| value(**c).is_empty())
        .map(ImportColumn::key)
        .collect();
    if !missing.is_empty() {
        return Err(format!("Missing required fields: {}", missing.join(", ")));
    }

    let code = value(ImportColumn::AgencyId).to_uppercase();
    let agency = lookup
        .agencies
        .get(&code)
        .cloned()
        .ok_or_else(|| format!("Agency not found: {code}"))?;

    let deadline = match value(ImportColumn::Deadline) {
        "" => None,
        raw => Some(parse_deadline(raw).ok_or_else(|| format!("Invalid deadline: {raw}"))?),
    };

    let position_ids: Vec<PositionId> = resolve(value(ImportColumn::AssignedTo), |name| {
        lookup.positions.get(name).map(|id| vec![PositionId::from_uuid(*id)])
    });
    let branch_unit_ids: Vec<BranchUnitId> = resolve(value(ImportColumn::BranchUnit), |name| {
        lookup
            .branch_units
            .get(name)
            .map(|id| vec![BranchUnitId::from_uuid(*id)])
    });
    let pic_ids: Vec<UserId> = resolve(value(ImportColumn::PersonInCharge), |name| {
        lookup.users.get(name).cloned()
    });

    let optional = |column: ImportColumn| Some(value(column).to_string()).filter(|v| !v.is_empty());
    Ok(NewRequirement {
        agency,
        category: value(ImportColumn::Category).to_string(),
        title: value(ImportColumn::Requirement).to_string(),
        description: optional(ImportColumn::Description),
        frequency: value(ImportColumn::Frequency).to_string(),
        schedule: optional(ImportColumn::Schedule),
        deadline,
        position_ids,
        branch_unit_ids,
        pic_ids,
    })
}

/// Resolve `;`-separated names case-insensitively; unknown names are skipped.
fn resolve<T: PartialEq>(raw: &str, find: impl Fn(&str) -> Option<Vec<T>>) -> Vec<T> {
    let mut ids = Vec::new();
    for name in raw.split(';').map(str::trim).filter(|n| !n.is_empty()) {
        for id in find(&name.to_lowercase()).unwrap_or_default() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }
    ids
}

/// Accepts ISO dates, `m/d/Y`, `Y/m/d`, and spreadsheet serial day numbers.
pub fn parse_deadline(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    for format in ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return Some(date);
        }
    }
    let serial: f64 = raw.parse().ok()?;
    if !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.trunc() as u64))
}

/// SuperAdmin-only bulk creation of requirements.
#[derive(Debug, Clone)]
pub struct ImportService {
    requirements: Arc<RequirementService>,
    agency_repo: Arc<AgencyRepository>,
    user_repo: Arc<UserRepository>,
    audit: Arc<AuditRecorder>,
}

impl ImportService {
    pub fn new(
        requirements: Arc<RequirementService>,
        agency_repo: Arc<AgencyRepository>,
        user_repo: Arc<UserRepository>,
        audit: Arc<AuditRecorder>,
    ) -> Self {
        Self {
            requirements,
            agency_repo,
            user_repo,
            audit,
        }
    }

    async fn lookup(&self) -> AppResult<ImportLookup> {
        let mut lookup = ImportLookup {
            agencies: self
                .agency_repo
                .list()
                .await?
                .into_iter()
                .map(|a| (a.code.to_uppercase(), a))
                .collect(),
            positions: self
                .requirements
                .positions()
                .name_index()
                .await?
                .into_iter()
                .map(|(id, name)| (name, id))
                .collect(),
            branch_units: self
                .requirements
                .branch_units()
                .name_index()
                .await?
                .into_iter()
                .map(|(id, name)| (name, id))
                .collect(),
            users: HashMap::new(),
        };
        for user in self.user_repo.find_all().await? {
            for key in [user.employee_name.to_lowercase(), user.user_code.to_lowercase()] {
                let ids = lookup.users.entry(key).or_default();
                if !ids.contains(&user.id) {
                    ids.push(user.id);
                }
            }
        }
        Ok(lookup)
    }

    /// Import every data row of an uploaded file.
    pub async fn import(
        &self,
        ctx: &RequestContext,
        file_name: &str,
        bytes: &[u8],
    ) -> AppResult<ImportReport> {
        ctx.require_super_admin()?;
        let format = ImportFormat::from_file_name(file_name)?;
        let mut rows = read_rows(format, bytes)?;
        if rows.len() < 2 {
            return Err(AppError::validation("No data rows found."));
        }

        let header = HeaderMap::from_row(&rows.remove(0));
        if let Some(column) = header.first_missing_required() {
            return Err(AppError::validation(format!(
                "Missing required column: {column}"
            )));
        }

        let lookup = self.lookup().await?;
        let mut report = ImportReport::default();
        for (index, row) in rows.iter().enumerate() {
            let row_number = index + 2;
            let outcome = match plan_row(&header.map_row(row), &lookup) {
                Ok(new) => self
                    .requirements
                    .persist(new)
                    .await
                    .map(|_| ())
                    .map_err(|e| e.message),
                Err(message) => Err(message),
            };
            match outcome {
                Ok(()) => report.created += 1,
                Err(message) => report.errors.push(ImportRowError {
                    row: row_number,
                    message,
                }),
            }
        }

        self.audit
            .record(
                Some(ctx),
                AuditAction::Imported,
                EntityType::Requirement,
                None,
                None,
                Some(json!({
                    "file_name": file_name,
                    "created": report.created,
                    "errors": report.errors.len(),
                })),
            )
            .await;
        info!(
            actor_id = %ctx.user_id,
            file_name,
            created = report.created,
            errors = report.errors.len(),
            "Requirements imported"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use comply_core::types::AgencyId;

    fn lookup() -> ImportLookup {
        let agency = Agency {
            id: AgencyId::new(),
            code: "BIR".to_string(),
            name: "Bureau of Internal Revenue".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut lookup = ImportLookup::default();
        lookup.agencies.insert("BIR".to_string(), agency);
        lookup
            .positions
            .insert("accountant".to_string(), Uuid::now_v7());
        lookup
            .branch_units
            .insert("head office".to_string(), Uuid::now_v7());
        let ana = UserId::new();
        lookup.users.insert("ana cruz".to_string(), vec![ana]);
        lookup.users.insert("pic-001".to_string(), vec![ana]);
        lookup
    }

    fn data(pairs: &[(ImportColumn, &str)]) -> HashMap<ImportColumn, String> {
        pairs.iter().map(|(c, v)| (*c, v.to_string())).collect()
    }

    fn complete() -> HashMap<ImportColumn, String> {
        data(&[
            (ImportColumn::AgencyId, "bir"),
            (ImportColumn::Category, "Tax"),
            (ImportColumn::Requirement, "Annual ITR"),
            (ImportColumn::AssignedTo, "Accountant; Auditor"),
            (ImportColumn::BranchUnit, "HEAD OFFICE"),
            (ImportColumn::Frequency, "Annual"),
            (ImportColumn::PersonInCharge, "Ana Cruz;PIC-001"),
            (ImportColumn::Deadline, "2030-04-15"),
        ])
    }

    #[test]
    fn test_plan_row_resolves_names() {
        let planned = plan_row(&complete(), &lookup()).unwrap();
        assert_eq!(planned.agency.code, "BIR");
        assert_eq!(planned.position_ids.len(), 1);
        assert_eq!(planned.branch_unit_ids.len(), 1);
        assert_eq!(planned.pic_ids.len(), 1);
        assert_eq!(planned.deadline, NaiveDate::from_ymd_opt(2030, 4, 15));
        assert_eq!(planned.description, None);
    }

    #[test]
    fn test_plan_row_lists_missing_fields() {
        let data = data(&[
            (ImportColumn::AgencyId, "BIR"),
            (ImportColumn::Requirement, "Annual ITR"),
            (ImportColumn::AssignedTo, "Accountant"),
            (ImportColumn::BranchUnit, "Head Office"),
        ]);
        let err = plan_row(&data, &lookup()).unwrap_err();
        assert_eq!(err, "Missing required fields: category, frequency");
    }

    #[test]
    fn test_plan_row_unknown_agency() {
        let mut data = complete();
        data.insert(ImportColumn::AgencyId, "sec".to_string());
        assert_eq!(plan_row(&data, &lookup()).unwrap_err(), "Agency not found: SEC");
    }

    #[test]
    fn test_plan_row_bad_deadline() {
        let mut data = complete();
        data.insert(ImportColumn::Deadline, "someday".to_string());
        assert_eq!(plan_row(&data, &lookup()).unwrap_err(), "Invalid deadline: someday");
    }

    #[test]
    fn test_parse_deadline_formats() {
        let expected = NaiveDate::from_ymd_opt(2026, 3, 31);
        assert_eq!(parse_deadline("2026-03-31"), expected);
        assert_eq!(parse_deadline("03/31/2026"), expected);
        assert_eq!(parse_deadline("2026/03/31"), expected);
        assert_eq!(parse_deadline("46112"), expected);
        assert_eq!(parse_deadline("-4"), None);
    }

    #[test]
    fn test_format_from_file_name() {
        assert_eq!(ImportFormat::from_file_name("list.CSV").unwrap(), ImportFormat::Csv);
        assert_eq!(ImportFormat::from_file_name("list.xlsx").unwrap(), ImportFormat::Xlsx);
        assert!(ImportFormat::from_file_name("list.pdf").is_err());
    }

    #[test]
    fn test_read_rows_from_workbook() {
        let bytes = xlsx::tests::workbook(
            &["Agency", "Category"],
            r#"<row r="1"><c r="A1" t="s"><v>0</v></c><c r="B1" t="s"><v>1</v></c></row>"#,
        );
        let rows = read_rows(ImportFormat::Xlsx, &bytes).unwrap();
        assert_eq!(rows, vec![vec!["Agency", "Category"]]);
    }
}
