//! Outgoing email: transport, templates, and compliance notifications.

pub mod mailer;
pub mod notifier;
pub mod templates;

pub use mailer::{LogMailer, MailError, Mailer, OutgoingMail, SmtpMailer, build_mailer};
pub use notifier::{ComplianceNotifier, NoticeContext};
