//! Token bucket configuration for each rate-limited action.

use serde::{Deserialize, Serialize};

/// Capacity and refill rate of one family of token buckets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketConfig {
    /// Maximum tokens a bucket can hold.
    pub capacity: f64,
    /// Tokens added per second.
    pub refill_per_second: f64,
}

impl BucketConfig {
    /// Create a bucket configuration.
    pub const fn new(capacity: f64, refill_per_second: f64) -> Self {
        Self {
            capacity,
            refill_per_second,
        }
    }
}

/// Rate limits for login attempts and per-connection message classes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Login attempts, keyed by client address.
    #[serde(default = "default_login")]
    pub login: BucketConfig,
    /// Chat messages, keyed by identity.
    #[serde(default = "default_chat")]
    pub chat: BucketConfig,
    /// Typing notifications, keyed by identity.
    #[serde(default = "default_typing")]
    pub typing: BucketConfig,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            login: default_login(),
            chat: default_chat(),
            typing: default_typing(),
        }
    }
}

fn default_login() -> BucketConfig {
    BucketConfig::new(5.0, 5.0 / 60.0)
}

fn default_chat() -> BucketConfig {
    BucketConfig::new(3.0, 1.0)
}

fn default_typing() -> BucketConfig {
    BucketConfig::new(3.0, 1.0)
}
