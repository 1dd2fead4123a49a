//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[serde(default)]
    #[validate(length(max = 128, message = "Username is too long"))]
    pub username: String,
    /// Password.
    #[serde(default)]
    #[validate(length(max = 1024, message = "Password is too long"))]
    pub password: String,
}

impl LoginRequest {
    /// Strip surrounding whitespace from both fields.
    pub fn normalized(self) -> Self {
        Self {
            username: self.username.trim().to_string(),
            password: self.password.trim().to_string(),
        }
    }
}
