//! A single token bucket.

use tokio::time::Instant;

use relayhub_core::config::BucketConfig;

/// Capped, continuously refilled credit balance.
///
/// Uses the tokio monotonic clock so the paused test clock drives it too.
#[derive(Debug, Clone)]
pub struct TokenBucket {
    capacity: f64,
    refill_rate: f64,
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// Creates a full bucket.
    pub fn new(config: BucketConfig) -> Self {
        Self::new_at(config, Instant::now())
    }

    /// Creates a full bucket whose refill clock starts at `now`.
    pub fn new_at(config: BucketConfig, now: Instant) -> Self {
        let capacity = config.capacity.max(0.0);
        Self {
            capacity,
            refill_rate: config.refill_per_second.max(0.0),
            tokens: capacity,
            last_refill: now,
        }
    }

    /// Adds `elapsed * rate` tokens, clamped to capacity. The refill clock
    /// never moves backwards.
    fn refill(&mut self, now: Instant) {
        if now <= self.last_refill {
            return;
        }
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.refill_rate).min(self.capacity);
        self.last_refill = now;
    }

    /// Refills, then takes `cost` tokens if available. A denied call leaves
    /// the balance untouched.
    pub fn try_consume_at(&mut self, cost: f64, now: Instant) -> bool {
        self.refill(now);
        if self.tokens >= cost {
            self.tokens -= cost;
            true
        } else {
            false
        }
    }

    /// [`try_consume_at`](Self::try_consume_at) with the current time.
    pub fn try_consume(&mut self, cost: f64) -> bool {
        self.try_consume_at(cost, Instant::now())
    }

    /// Whether the bucket would be back at capacity at `now`.
    pub fn is_full_at(&self, now: Instant) -> bool {
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens + elapsed * self.refill_rate >= self.capacity
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn bucket(capacity: f64, rate: f64) -> TokenBucket {
        TokenBucket::new(BucketConfig::new(capacity, rate))
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_then_deny_then_refill() {
        let mut b = bucket(3.0, 1.0);
        assert!(b.try_consume(1.0));
        assert!(b.try_consume(1.0));
        assert!(b.try_consume(1.0));
        assert!(!b.try_consume(1.0));

        // capacity / rate seconds
        tokio::time::advance(Duration::from_secs(3)).await;
        assert!(b.try_consume(1.0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_denied_call_leaves_tokens_unchanged() {
        let mut b = bucket(2.0, 1.0);
        assert!(b.try_consume(1.5));
        assert!(!b.try_consume(1.0));
        assert!((b.tokens - 0.5).abs() < 1e-9);

        tokio::time::advance(Duration::from_millis(500)).await;
        assert!(b.try_consume(1.0));
        assert!(b.tokens.abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_clamped_to_capacity() {
        let mut b = bucket(3.0, 1.0);
        assert!(b.try_consume(3.0));
        tokio::time::advance(Duration::from_secs(100)).await;

        let granted = (0..10).filter(|_| b.try_consume(1.0)).count();
        assert_eq!(granted, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_login_refill() {
        let mut b = bucket(5.0, 5.0 / 60.0);
        for _ in 0..5 {
            assert!(b.try_consume(1.0));
        }
        assert!(!b.try_consume(1.0));

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(!b.try_consume(1.0));

        tokio::time::advance(Duration::from_secs(6)).await;
        assert!(b.try_consume(1.0));
    }

    #[test]
    fn test_clock_going_backwards_is_ignored() {
        let start = Instant::now();
        let later = start + Duration::from_secs(10);
        let mut b = TokenBucket::new_at(BucketConfig::new(1.0, 1.0), later);
        assert!(b.try_consume_at(1.0, later));
        assert!(!b.try_consume_at(1.0, start));
        assert!(b.try_consume_at(1.0, later + Duration::from_secs(1)));
    }

    #[test]
    fn test_is_full_at() {
        let now = Instant::now();
        let mut b = TokenBucket::new_at(BucketConfig::new(2.0, 1.0), now);
        assert!(b.is_full_at(now));
        assert!(b.try_consume_at(1.0, now));
        assert!(!b.is_full_at(now));
        assert!(b.is_full_at(now + Duration::from_secs(1)));
    }
}
