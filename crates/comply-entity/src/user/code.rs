//! Human-readable user codes (`SA-123`, `PIC-042`).

use super::role::UserRole;

/// Prefix used for a role's user codes.
pub fn user_code_prefix(role: Option<UserRole>) -> &'static str {
    match role {
        Some(UserRole::SuperAdmin) => "SA",
        Some(UserRole::AdminSpecialist) => "AS",
        Some(UserRole::Pic) => "PIC",
        None => "USR",
    }
}

/// Format a code from a prefix and a number, zero-padded to `digits`.
pub fn format_user_code(prefix: &str, number: u32, digits: usize) -> String {
    format!("{prefix}-{number:0digits$}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes() {
        assert_eq!(user_code_prefix(Some(UserRole::SuperAdmin)), "SA");
        assert_eq!(user_code_prefix(Some(UserRole::Pic)), "PIC");
        assert_eq!(user_code_prefix(None), "USR");
    }

    #[test]
    fn test_format_pads() {
        assert_eq!(format_user_code("AS", 7, 3), "AS-007");
        assert_eq!(format_user_code("PIC", 1234, 4), "PIC-1234");
    }
}
