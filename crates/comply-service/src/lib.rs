//! # comply-service
//!
//! Business logic service layer for the compliance tracker. Each service
//! orchestrates repositories, storage, mail, and authentication to
//! implement one group of use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references. State-changing use cases
//! write their audit entries explicitly through [`AuditRecorder`].

pub mod agency;
pub mod audit;
pub mod compliance;
pub mod context;
pub mod dashboard;
pub mod notification;
pub mod reference;
pub mod reminder;
pub mod requirement;
pub mod upload;
pub mod user;

pub use agency::AgencyService;
pub use audit::{AuditRecorder, AuditService};
pub use compliance::OverdueService;
pub use context::RequestContext;
pub use dashboard::DashboardService;
pub use notification::{ComplianceNotifier, LogMailer, Mailer, SmtpMailer};
pub use reference::ReferenceService;
pub use reminder::{ReminderReport, ReminderService};
pub use requirement::{ImportService, RequirementService};
pub use upload::{DocumentAccessService, UploadService};
pub use user::{AuthService, ProfileService, UserAdminService};
