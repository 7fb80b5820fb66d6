//! User code allocation.

use uuid::Uuid;

use comply_core::result::AppResult;
use comply_database::repositories::UserRepository;
use comply_entity::user::{UserRole, format_user_code, user_code_prefix};

const MAX_SHORT_ATTEMPTS: usize = 10;

fn random_below(bound: u32) -> u32 {
    let bytes = Uuid::new_v4().into_bytes();
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) % bound
}

/// A random three-digit candidate, `001` to `999`.
pub fn short_candidate(prefix: &str) -> String {
    format_user_code(prefix, 1 + random_below(999), 3)
}

/// A random four-digit candidate, `1000` to `9999`.
pub fn long_candidate(prefix: &str) -> String {
    format_user_code(prefix, 1000 + random_below(9000), 4)
}

/// Pick an unused code for a new account of the given role.
///
/// Tries ten three-digit codes, then falls back to a four-digit code
/// without checking it.
pub async fn allocate_user_code(
    user_repo: &UserRepository,
    role: Option<UserRole>,
) -> AppResult<String> {
    let prefix = user_code_prefix(role);
    for _ in 0..MAX_SHORT_ATTEMPTS {
        let candidate = short_candidate(prefix);
        if !user_repo.code_exists(&candidate).await? {
            return Ok(candidate);
        }
    }
    Ok(long_candidate(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_shapes() {
        for _ in 0..50 {
            let short = short_candidate("PIC");
            let n: u32 = short["PIC-".len()..].parse().unwrap();
            assert_eq!(short.len(), "PIC-000".len());
            assert!((1..=999).contains(&n));

            let long = long_candidate("SA");
            let n: u32 = long["SA-".len()..].parse().unwrap();
            assert!((1000..=9999).contains(&n));
        }
    }
}
