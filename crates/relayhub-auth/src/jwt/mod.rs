//! JWT token encoding, decoding, and claims.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::Claims;
pub use decoder::JwtDecoder;
pub use encoder::JwtEncoder;

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use uuid::Uuid;

    use relayhub_core::Identity;
    use relayhub_core::config::AuthConfig;
    use relayhub_core::error::ErrorKind;
    use relayhub_core::traits::{TokenIssuer, TokenVerifier};

    use super::*;

    fn config(secret: &str) -> AuthConfig {
        AuthConfig {
            jwt_secret: secret.to_string(),
            leeway_seconds: 0,
            ..AuthConfig::default()
        }
    }

    #[test]
    fn test_mint_then_verify() {
        let cfg = config("secret");
        let token = JwtEncoder::new(&cfg).mint(&Identity::from("alice")).unwrap();
        let identity = JwtDecoder::new(&cfg).verify(&token).unwrap();
        assert_eq!(identity.as_str(), "alice");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = JwtEncoder::new(&config("one"))
            .mint(&Identity::from("alice"))
            .unwrap();
        let err = JwtDecoder::new(&config("two")).verify(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_garbage_rejected() {
        let err = JwtDecoder::new(&config("secret"))
            .verify("not-a-jwt")
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[test]
    fn test_expired_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "alice".to_string(),
            iat: now - 3600,
            exp: now - 1800,
            jti: Uuid::new_v4(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        let err = JwtDecoder::new(&config("secret")).verify(&token).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
        assert!(err.message.contains("expired"));
    }

    #[test]
    fn test_empty_subject_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: String::new(),
            iat: now,
            exp: now + 60,
            jti: Uuid::new_v4(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"secret"),
        )
        .unwrap();

        assert!(JwtDecoder::new(&config("secret")).verify(&token).is_err());
    }
}
