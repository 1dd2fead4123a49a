//! Keyed token bucket limiter and per-identity message limits.

use std::fmt;
use std::hash::Hash;

use dashmap::DashMap;
use tokio::time::Instant;

use relayhub_core::config::{BucketConfig, RateLimitConfig};
use relayhub_core::types::Identity;

use super::bucket::TokenBucket;

/// A map of independent token buckets sharing one configuration.
///
/// Buckets are created lazily, full, on first use of a key. Each
/// check-and-consume runs under the key's shard lock, so concurrent callers
/// for the same key never double-spend a token.
pub struct RateLimiter<K: Eq + Hash> {
    config: BucketConfig,
    buckets: DashMap<K, TokenBucket>,
}

impl<K: Eq + Hash + Clone> RateLimiter<K> {
    /// Create an empty limiter.
    pub fn new(config: BucketConfig) -> Self {
        Self {
            config,
            buckets: DashMap::new(),
        }
    }

    /// Bucket shape used for every key.
    pub fn config(&self) -> BucketConfig {
        self.config
    }

    /// Take one token for `key`.
    pub fn try_consume(&self, key: &K) -> bool {
        self.try_consume_n(key, 1.0)
    }

    /// Take `cost` tokens for `key`.
    pub fn try_consume_n(&self, key: &K, cost: f64) -> bool {
        // The clock is read after the entry lock is held.
        if let Some(mut bucket) = self.buckets.get_mut(key) {
            return bucket.try_consume(cost);
        }
        self.buckets
            .entry(key.clone())
            .or_insert_with(|| TokenBucket::new(self.config))
            .try_consume(cost)
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether no key is tracked.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Drop buckets that have refilled to capacity. A fresh bucket for the
    /// same key behaves identically, so this never changes an outcome.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let before = self.buckets.len();
        self.buckets.retain(|_, bucket| !bucket.is_full_at(now));
        before.saturating_sub(self.buckets.len())
    }
}

impl<K: Eq + Hash> fmt::Debug for RateLimiter<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RateLimiter")
            .field("config", &self.config)
            .field("keys", &self.buckets.len())
            .finish()
    }
}

/// Inbound message classes that are rate limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageClass {
    /// `chat`
    Chat,
    /// `typing`
    Typing,
}

impl MessageClass {
    /// Wire name of the class.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Typing => "typing",
        }
    }
}

impl fmt::Display for MessageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-identity budgets for inbound WebSocket messages. All connections of
/// one identity share a bucket per class.
#[derive(Debug)]
pub struct MessageLimits {
    chat: RateLimiter<Identity>,
    typing: RateLimiter<Identity>,
}

impl MessageLimits {
    /// Build from the rate limit configuration.
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            chat: RateLimiter::new(config.chat),
            typing: RateLimiter::new(config.typing),
        }
    }

    /// Consume one token of `class` for `identity`.
    pub fn allow(&self, identity: &Identity, class: MessageClass) -> bool {
        match class {
            MessageClass::Chat => self.chat.try_consume(identity),
            MessageClass::Typing => self.typing.try_consume(identity),
        }
    }

    /// Buckets currently held across both classes.
    pub fn tracked(&self) -> usize {
        self.chat.len() + self.typing.len()
    }

    /// Sweep both limiters; returns the number of buckets dropped.
    pub fn sweep(&self) -> usize {
        self.chat.sweep() + self.typing.sweep()
    }
}
