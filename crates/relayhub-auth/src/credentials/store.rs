//! Credential store seeded from the `[[auth.users]]` configuration table.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use relayhub_core::Identity;
use relayhub_core::config::UserCredential;
use relayhub_core::error::AppError;
use relayhub_core::traits::CredentialStore;

use crate::password::PasswordHasher;

/// In-memory username → Argon2id hash table.
#[derive(Debug, Clone)]
pub struct ConfigCredentialStore {
    users: Arc<HashMap<String, String>>,
    hasher: PasswordHasher,
}

impl ConfigCredentialStore {
    /// Builds the store, rejecting entries whose hash is not a PHC string.
    pub fn new(users: &[UserCredential]) -> Result<Self, AppError> {
        let hasher = PasswordHasher::new();
        let mut table = HashMap::with_capacity(users.len());

        for user in users {
            hasher.validate_hash(&user.password_hash).map_err(|e| {
                AppError::configuration(format!("User '{}': {}", user.username, e.message))
            })?;
            table.insert(user.username.clone(), user.password_hash.clone());
        }

        Ok(Self {
            users: Arc::new(table),
            hasher,
        })
    }

    /// Number of configured accounts.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether no accounts are configured.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl CredentialStore for ConfigCredentialStore {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Identity, AppError> {
        let Some(hash) = self.users.get(username).cloned() else {
            debug!(user = %username, "Login for unknown user");
            return Err(AppError::invalid_credentials("Invalid username or password"));
        };

        // Argon2 is CPU-bound; keep it off the async workers.
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let matches = tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::internal(format!("Password check task failed: {e}")))??;

        if matches {
            Ok(Identity::new(username))
        } else {
            debug!(user = %username, "Login with wrong password");
            Err(AppError::invalid_credentials("Invalid username or password"))
        }
    }
}
