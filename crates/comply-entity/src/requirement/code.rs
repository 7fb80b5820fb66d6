//! Agency-prefixed requirement code sequence (`BIR-001`, `BIR-002`, ...).

/// Extract the numeric sequence from a code of the form `PREFIX-NNN`.
///
/// Requires at least three digits after the prefix, matching the codes
/// this module produces. Returns `None` for codes of any other shape.
pub fn parse_requirement_sequence(prefix: &str, code: &str) -> Option<u32> {
    let digits = code.strip_prefix(prefix)?.strip_prefix('-')?;
    if digits.len() < 3 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Code following `latest` for the given agency code.
///
/// `latest` is the most recently issued code for the agency, read under a
/// row lock by the caller. The sequence is padded to three digits and
/// grows past 999 without truncation.
pub fn next_requirement_code(agency_code: &str, latest: Option<&str>) -> String {
    let prefix = agency_code.trim().to_uppercase();
    let next = latest
        .and_then(|code| parse_requirement_sequence(&prefix, code))
        .map(|n| n + 1)
        .unwrap_or(1);
    format!("{prefix}-{next:03}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_code_for_agency() {
        assert_eq!(next_requirement_code("bir", None), "BIR-001");
    }

    #[test]
    fn test_increments_latest() {
        assert_eq!(next_requirement_code("BIR", Some("BIR-009")), "BIR-010");
        assert_eq!(next_requirement_code("BIR", Some("BIR-999")), "BIR-1000");
    }

    #[test]
    fn test_foreign_shape_restarts() {
        assert_eq!(next_requirement_code("SEC", Some("SEC-7")), "SEC-001");
        assert_eq!(next_requirement_code("SEC", Some("SECX-004")), "SEC-001");
        assert_eq!(parse_requirement_sequence("SEC", "SEC-00a"), None);
    }
}
