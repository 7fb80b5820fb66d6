//! Audit log CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use crate::output::{self, OutputFormat};
use comply_core::config::AppConfig;
use comply_core::error::AppError;
use comply_core::types::{PageRequest, UserId};
use comply_database::repositories::{AuditLogFilter, AuditLogRepository};
use comply_entity::audit::AuditLogWithActor;

/// Arguments for audit commands
#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Audit subcommand
    #[command(subcommand)]
    pub command: AuditCommand,
}

/// Audit subcommands
#[derive(Debug, Subcommand)]
pub enum AuditCommand {
    /// Latest entries, newest first
    Recent {
        /// Number of results
        #[arg(short, long, default_value = "20")]
        limit: i64,
    },
    /// Search the audit log, newest first
    List {
        /// Filter by action, e.g. APPROVED
        #[arg(short, long)]
        action: Option<String>,
        /// Filter by entity type, e.g. upload
        #[arg(long)]
        entity_type: Option<String>,
        /// Filter by actor (user ID)
        #[arg(long)]
        actor: Option<String>,
        /// Number of results
        #[arg(short, long, default_value = "50")]
        limit: u64,
    },
}

/// Audit display row
#[derive(Debug, Serialize, Tabled)]
struct AuditRow {
    /// Time
    time: String,
    /// Actor
    actor: String,
    /// Action
    action: String,
    /// Entity
    entity: String,
    /// IP
    ip: String,
}

impl From<&AuditLogWithActor> for AuditRow {
    fn from(e: &AuditLogWithActor) -> Self {
        let entry = &e.entry;
        Self {
            time: entry.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            actor: e.actor_name.clone().unwrap_or_else(|| "system".to_string()),
            action: entry.action.clone(),
            entity: match entry.entity_id {
                Some(id) => format!("{} {}", entry.entity_type, id),
                None => entry.entity_type.clone(),
            },
            ip: entry.ip_address.clone().unwrap_or_default(),
        }
    }
}

/// Execute audit commands
pub async fn execute(
    args: &AuditArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        AuditCommand::Recent { limit } => {
            let state = super::app_state(config).await?;
            let entries = state.audit_service.recent(*limit).await?;
            let rows: Vec<AuditRow> = entries.iter().map(AuditRow::from).collect();
            output::print_list(&rows, format);
            state.db.close().await;
        }
        AuditCommand::List {
            action,
            entity_type,
            actor,
            limit,
        } => {
            let actor_user_id = actor
                .as_deref()
                .map(|a| {
                    Uuid::parse_str(a.trim())
                        .map(UserId::from)
                        .map_err(|e| AppError::validation(format!("Invalid UUID: {}", e)))
                })
                .transpose()?;

            let filter = AuditLogFilter {
                actor_user_id,
                action: action.as_deref().map(|a| a.trim().to_uppercase()),
                entity_type: entity_type.clone(),
                ..AuditLogFilter::default()
            };

            let db = super::connect(&config).await?;
            let response = AuditLogRepository::new(db.pool().clone())
                .search(&filter, &PageRequest::new(1, *limit))
                .await?;

            let rows: Vec<AuditRow> = response.items.iter().map(AuditRow::from).collect();
            output::print_list(&rows, format);
            if response.has_next {
                println!("Showing {} of {} entries.", rows.len(), response.total_items);
            }
            db.close().await;
        }
    }

    Ok(())
}
