//! Outgoing SMTP configuration.

use serde::{Deserialize, Serialize};

/// SMTP delivery settings for notification and reminder emails.
///
/// When `enabled` is false, messages are written to the log instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_host")]
    pub smtp_host: String,
    #[serde(default = "default_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_from_address")]
    pub from_address: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Base URL of the web front end, used for links in emails.
    #[serde(default = "default_app_url")]
    pub app_url: String,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            smtp_host: default_host(),
            smtp_port: default_port(),
            username: None,
            password: None,
            from_address: default_from_address(),
            from_name: default_from_name(),
            app_url: default_app_url(),
        }
    }
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_port() -> u16 {
    587
}

fn default_from_address() -> String {
    "no-reply@compliance.local".to_string()
}

fn default_from_name() -> String {
    "Compliance Tracker".to_string()
}

fn default_app_url() -> String {
    "http://localhost:5173".to_string()
}
