//! WebSocket authentication: validates the bearer token presented on the
//! upgrade request.

use std::sync::Arc;

use relayhub_core::error::AppError;
use relayhub_core::traits::TokenVerifier;
use relayhub_core::types::Identity;

/// Authenticates WebSocket connections before the upgrade.
#[derive(Clone)]
pub struct WsAuthenticator {
    verifier: Arc<dyn TokenVerifier>,
}

impl std::fmt::Debug for WsAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WsAuthenticator").finish()
    }
}

impl WsAuthenticator {
    /// Creates a new WebSocket authenticator.
    pub fn new(verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { verifier }
    }

    /// Resolves a token to an identity. A missing or blank token fails
    /// without consulting the verifier.
    pub fn authenticate(&self, token: Option<&str>) -> Result<Identity, AppError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::authentication("Missing bearer token"))?;
        self.verifier.verify(token)
    }
}

/// Extracts the credential from an `Authorization: Bearer <token>` value.
/// The scheme is matched case-insensitively.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
pub(crate) mod tests {
    use relayhub_core::AppResult;
    use relayhub_core::error::ErrorKind;

    use super::*;

    /// Accepts tokens of the form `valid:<name>`.
    pub(crate) struct PrefixVerifier;

    impl TokenVerifier for PrefixVerifier {
        fn verify(&self, token: &str) -> AppResult<Identity> {
            token
                .strip_prefix("valid:")
                .filter(|name| !name.is_empty())
                .map(Identity::from)
                .ok_or_else(|| AppError::authentication("Invalid token"))
        }
    }

    #[test]
    fn test_authenticate() {
        let auth = WsAuthenticator::new(Arc::new(PrefixVerifier));
        assert_eq!(auth.authenticate(Some("valid:alice")).unwrap(), Identity::from("alice"));

        for token in [None, Some(""), Some("   "), Some("forged")] {
            let err = auth.authenticate(token).unwrap_err();
            assert_eq!(err.kind, ErrorKind::Authentication);
        }
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("bearer   xyz "), Some("xyz"));
        assert_eq!(bearer_token("Basic abc"), None);
        assert_eq!(bearer_token("Bearer "), None);
        assert_eq!(bearer_token("Bearer"), None);
    }
}
