//! JWT token encoding, decoding, and claims management.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::{Claims, DownloadClaims, TokenType};
pub use decoder::JwtDecoder;
pub use encoder::{JwtEncoder, TokenPair};

#[cfg(test)]
mod tests {
    use super::*;
    use comply_core::config::AuthConfig;
    use comply_core::error::ErrorKind;
    use comply_core::types::{SessionId, UploadId, UserId};
    use comply_entity::user::UserRole;

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret-with-enough-entropy".to_string(),
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_token_pair_round_trip() {
        let cfg = config();
        let encoder = JwtEncoder::new(&cfg);
        let decoder = JwtDecoder::new(&cfg);
        let user = UserId::new();

        let pair = encoder
            .generate_token_pair(user, SessionId::new(), UserRole::AdminSpecialist, "a@x.io")
            .unwrap();

        let access = decoder.decode_access_token(&pair.access_token).unwrap();
        assert_eq!(access.sub, user);
        assert_eq!(access.role, UserRole::AdminSpecialist);

        let err = decoder.decode_access_token(&pair.refresh_token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert!(decoder.decode_refresh_token(&pair.refresh_token).is_ok());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let encoder = JwtEncoder::new(&config());
        let other = JwtDecoder::new(&AuthConfig {
            jwt_secret: "another-secret".to_string(),
            ..AuthConfig::default()
        });
        let pair = encoder
            .generate_token_pair(UserId::new(), SessionId::new(), UserRole::Pic, "p@x.io")
            .unwrap();
        assert!(other.decode_access_token(&pair.access_token).is_err());
    }

    #[test]
    fn test_download_token_is_bound_to_upload() {
        let cfg = config();
        let encoder = JwtEncoder::new(&cfg);
        let decoder = JwtDecoder::new(&cfg);
        let upload = UploadId::new();

        let (token, _) = encoder.sign_download(upload, UserId::new(), true).unwrap();
        let claims = decoder.decode_download_token(&token, upload).unwrap();
        assert!(claims.inline);

        let err = decoder.decode_download_token(&token, UploadId::new()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authorization);

        let pair = encoder
            .generate_token_pair(UserId::new(), SessionId::new(), UserRole::Pic, "p@x.io")
            .unwrap();
        assert!(decoder.decode_download_token(&pair.access_token, upload).is_err());
    }
}
