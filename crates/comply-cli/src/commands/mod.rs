//! CLI command definitions and dispatch.

pub mod audit;
pub mod job;
pub mod migrate;
pub mod user;

use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use comply_api::AppState;
use comply_core::config::AppConfig;
use comply_core::error::AppError;
use comply_database::DatabasePool;

/// Compliance tracker administration
#[derive(Debug, Parser)]
#[command(name = "comply", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file, without extension
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay loaded next to the base file (defaults to `COMPLY_ENV`)
    #[arg(short, long)]
    pub env: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Deadline reminder emails
    Reminders(job::RemindersArgs),
    /// Overdue assignment marking
    Overdue(job::OverdueArgs),
    /// User management
    User(user::UserArgs),
    /// Audit log
    Audit(audit::AuditArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let env = self
            .env
            .clone()
            .or_else(|| std::env::var("COMPLY_ENV").ok())
            .unwrap_or_else(|| "development".to_string());
        let config = AppConfig::load_from(&self.config, &env)?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config).await,
            Commands::Reminders(args) => job::reminders(args, config, self.format).await,
            Commands::Overdue(args) => job::overdue(args, config, self.format).await,
            Commands::User(args) => user::execute(args, config, self.format).await,
            Commands::Audit(args) => audit::execute(args, config, self.format).await,
        }
    }
}

/// Helper: connect to the database
pub async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}

/// Helper: the same service graph the server runs with
pub async fn app_state(config: AppConfig) -> Result<AppState, AppError> {
    let db = connect(&config).await?;
    comply_api::build_state(config, db).await
}

/// Helper: parse `--date`, defaulting to today (UTC)
pub fn run_date(date: Option<&str>) -> Result<NaiveDate, AppError> {
    match date {
        Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| AppError::validation(format!("Invalid date '{}', expected YYYY-MM-DD", raw))),
        None => Ok(Utc::now().date_naive()),
    }
}

/// Helper: ask before a destructive change unless `--yes` was given
pub fn confirm(prompt: &str, assume_yes: bool) -> Result<bool, AppError> {
    if assume_yes {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| AppError::internal(format!("Input error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_date_parses_iso() {
        let date = run_date(Some("2026-03-31")).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
    }

    #[test]
    fn test_run_date_rejects_other_formats() {
        assert!(run_date(Some("03/31/2026")).is_err());
        assert!(run_date(None).is_ok());
    }

    #[test]
    fn test_cli_parses_overdue_mark() {
        let cli = Cli::try_parse_from(["comply", "overdue", "mark", "--date", "2026-01-05"]).unwrap();
        assert_eq!(cli.config, "config/default");
        assert!(matches!(cli.command, Commands::Overdue(_)));
    }

    #[test]
    fn test_cli_parses_audit_list_filters() {
        let cli = Cli::try_parse_from(["comply", "-f", "json", "audit", "list", "-a", "approved"])
            .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Audit(_)));
    }
}
