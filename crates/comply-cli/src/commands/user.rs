//! User management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use comply_core::config::AppConfig;
use comply_core::error::AppError;
use comply_database::repositories::UserRepository;
use comply_entity::user::{User, UserRole};
use comply_service::user::{AdminCreateUser, AdminUpdateUser};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List all users
    List {
        /// Filter by role (super_admin, admin_specialist, pic)
        #[arg(short, long)]
        role: Option<String>,
    },
    /// Create an account; prompts for the password when not given
    Create {
        /// Employee name
        #[arg(short, long)]
        name: String,
        /// Login email
        #[arg(long)]
        email: String,
        /// Role (super_admin, admin_specialist, pic)
        #[arg(short, long, default_value = "pic")]
        role: String,
        /// Branch
        #[arg(short, long)]
        branch: Option<String>,
        /// Password
        #[arg(long)]
        password: Option<String>,
    },
    /// Allow a user to log in again
    Activate {
        /// Login email
        email: String,
    },
    /// Block a user from logging in
    Deactivate {
        /// Login email
        email: String,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    /// Code
    code: String,
    /// Name
    name: String,
    /// Email
    email: String,
    /// Role
    role: String,
    /// Active
    active: bool,
    /// Last login
    last_login: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            code: u.user_code.clone(),
            name: u.employee_name.clone(),
            email: u.email.clone(),
            role: u.role.to_string(),
            active: u.is_active,
            last_login: u
                .last_login_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_default(),
        }
    }
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config: AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let state = super::app_state(config).await?;
    let users = &state.user_admin_service;

    match &args.command {
        UserCommand::List { role } => {
            let role = role.as_deref().map(str::parse::<UserRole>).transpose()?;
            let rows: Vec<UserRow> = users
                .all()
                .await?
                .iter()
                .filter(|u| role.is_none_or(|r| u.role == r))
                .map(UserRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        UserCommand::Create {
            name,
            email,
            role,
            branch,
            password,
        } => {
            let role: UserRole = role.parse()?;
            let password = match password {
                Some(p) => p.clone(),
                None => dialoguer::Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords do not match.")
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {}", e)))?,
            };

            let user = users
                .create(
                    None,
                    AdminCreateUser {
                        employee_name: name.clone(),
                        email: email.clone(),
                        branch: branch.clone(),
                        role,
                        password,
                        is_active: true,
                    },
                )
                .await?;
            output::print_success(&format!("User '{}' created", user.email));
            output::print_kv("Code", &user.user_code);
            output::print_kv("Role", user.role.label());
        }
        UserCommand::Activate { email } => {
            let user = find_user(&state.db, email).await?;
            set_active(users, &user, true).await?;
            output::print_success(&format!("User '{}' activated", user.email));
        }
        UserCommand::Deactivate { email, yes } => {
            let user = find_user(&state.db, email).await?;
            let prompt = format!("Deactivate '{}' ({})?", user.employee_name, user.email);
            if !super::confirm(&prompt, *yes)? {
                println!("Cancelled.");
            } else {
                set_active(users, &user, false).await?;
                output::print_success(&format!("User '{}' deactivated", user.email));
            }
        }
    }

    state.db.close().await;
    Ok(())
}

async fn find_user(db: &comply_database::DatabasePool, email: &str) -> Result<User, AppError> {
    UserRepository::new(db.pool().clone())
        .find_by_email(email.trim())
        .await?
        .ok_or_else(|| AppError::not_found(format!("User '{}' not found", email)))
}

async fn set_active(
    users: &comply_service::UserAdminService,
    user: &User,
    active: bool,
) -> Result<(), AppError> {
    users
        .update(
            None,
            user.id,
            AdminUpdateUser {
                is_active: Some(active),
                ..AdminUpdateUser::default()
            },
        )
        .await?;
    Ok(())
}
