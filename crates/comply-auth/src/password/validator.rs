//! Password policy checks for new passwords.

use comply_core::config::AuthConfig;
use comply_core::error::AppError;

/// Enforces minimum length and confirmation matching.
#[derive(Debug, Clone)]
pub struct PasswordValidator {
    min_length: usize,
}

impl PasswordValidator {
    /// Creates a new validator from auth configuration.
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            min_length: config.password_min_length,
        }
    }

    /// Check a new password and its confirmation.
    pub fn validate(&self, password: &str, confirmation: &str) -> Result<(), AppError> {
        if password.chars().count() < self.min_length {
            return Err(AppError::validation(format!(
                "The password must be at least {} characters.",
                self.min_length
            )));
        }
        if password != confirmation {
            return Err(AppError::validation(
                "The password confirmation does not match.",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_length_and_confirmation() {
        let validator = PasswordValidator::new(&AuthConfig::default());
        assert!(validator.validate("longenough", "longenough").is_ok());
        assert!(validator.validate("short", "short").is_err());
        let err = validator.validate("longenough", "different").unwrap_err();
        assert_eq!(err.message, "The password confirmation does not match.");
    }
}
