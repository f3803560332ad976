//! Per-user command rate limiting with token buckets.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Rate limit configuration: a steady per-minute rate with a burst ceiling.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RateLimit {
    /// Sustained tokens granted per minute
    pub per_minute: u32,
    /// Bucket capacity, the largest burst a user can spend at once
    pub burst: u32,
}

impl RateLimit {
    /// Create a new rate limit.
    pub fn new(per_minute: u32, burst: u32) -> Self {
        Self { per_minute, burst }
    }
}

impl Default for RateLimit {
    /// The command-surface default: 30 commands per minute, burst of 10.
    fn default() -> Self {
        Self::new(30, 10)
    }
}

#[derive(Debug)]
struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(limit: RateLimit) -> Self {
        Self {
            tokens: limit.burst as f64,
            last_refill: Instant::now(),
        }
    }

    fn try_consume(&mut self, limit: RateLimit) -> Result<(), Duration> {
        let now = Instant::now();
        let rate = limit.per_minute as f64 / 60.0;
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * rate).min(limit.burst as f64);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            Ok(())
        } else {
            Err(Duration::from_secs_f64((1.0 - self.tokens) / rate))
        }
    }
}

/// Idle buckets are swept every this many checks.
const PRUNE_INTERVAL: u64 = 1024;

/// Tracks one token bucket per Discord user.
///
/// Callers hold this behind a mutex; checks are cheap and never block on IO.
#[derive(Debug)]
pub struct RateLimiter {
    limit: RateLimit,
    buckets: HashMap<u64, TokenBucket>,
    checks: u64,
}

impl RateLimiter {
    /// Create a limiter applying `limit` independently to each user.
    pub fn new(limit: RateLimit) -> Self {
        Self {
            limit,
            buckets: HashMap::new(),
            checks: 0,
        }
    }

    /// Consume one token for `user_id`. `Err` carries the wait until a token
    /// is available, for the "slow down" reply.
    #[instrument(skip(self))]
    pub fn check(&mut self, user_id: u64) -> Result<(), Duration> {
        self.checks = self.checks.wrapping_add(1);
        if self.checks % PRUNE_INTERVAL == 0 {
            self.prune();
        }

        let limit = self.limit;
        let bucket = self
            .buckets
            .entry(user_id)
            .or_insert_with(|| TokenBucket::new(limit));
        match bucket.try_consume(limit) {
            Ok(()) => {
                debug!(tokens_remaining = bucket.tokens, "rate limit check passed");
                Ok(())
            }
            Err(retry_after) => {
                debug!(retry_after_secs = retry_after.as_secs_f64(), "rate limited");
                Err(retry_after)
            }
        }
    }

    /// Drop buckets that have fully refilled, bounding memory on busy
    /// guilds. Runs automatically every [`PRUNE_INTERVAL`] checks; a full
    /// bucket is indistinguishable from a fresh one, so dropping it is safe.
    pub fn prune(&mut self) {
        let limit = self.limit;
        let full_refill = Duration::from_secs_f64(limit.burst as f64 * 60.0 / limit.per_minute as f64);
        self.buckets
            .retain(|_, bucket| bucket.last_refill.elapsed() < full_refill);
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimit::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_within_burst() {
        let mut limiter = RateLimiter::new(RateLimit::new(60, 3));
        assert!(limiter.check(1).is_ok());
        assert!(limiter.check(1).is_ok());
        assert!(limiter.check(1).is_ok());
    }

    #[test]
    fn blocks_over_burst() {
        let mut limiter = RateLimiter::new(RateLimit::new(60, 2));
        assert!(limiter.check(1).is_ok());
        assert!(limiter.check(1).is_ok());
        assert!(limiter.check(1).is_err());
    }

    #[test]
    fn users_have_independent_buckets() {
        let mut limiter = RateLimiter::new(RateLimit::new(60, 1));
        assert!(limiter.check(1).is_ok());
        assert!(limiter.check(1).is_err());
        assert!(limiter.check(2).is_ok());
    }

    #[test]
    fn refills_over_time() {
        // 600/min refills a token every 100ms.
        let mut limiter = RateLimiter::new(RateLimit::new(600, 1));
        assert!(limiter.check(1).is_ok());
        assert!(limiter.check(1).is_err());
        std::thread::sleep(Duration::from_millis(150));
        assert!(limiter.check(1).is_ok());
    }

    #[test]
    fn retry_after_is_positive() {
        let mut limiter = RateLimiter::new(RateLimit::new(60, 1));
        limiter.check(1).unwrap();
        let retry_after = limiter.check(1).unwrap_err();
        assert!(retry_after > Duration::ZERO);
    }

    #[test]
    fn prune_drops_idle_buckets() {
        let mut limiter = RateLimiter::new(RateLimit::new(6000, 1));
        limiter.check(1).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        limiter.prune();
        assert!(limiter.buckets.is_empty());
    }

    #[test]
    fn check_sweeps_idle_buckets_on_cadence() {
        // 6000/min refills a burst-1 bucket in 10ms, making every bucket
        // prunable after a short sleep.
        let mut limiter = RateLimiter::new(RateLimit::new(6000, 1));
        for user_id in 0..PRUNE_INTERVAL - 1 {
            let _ = limiter.check(user_id);
        }
        assert_eq!(limiter.buckets.len(), (PRUNE_INTERVAL - 1) as usize);

        std::thread::sleep(Duration::from_millis(20));
        // The PRUNE_INTERVAL-th check sweeps before tracking its own user.
        limiter.check(u64::MAX).unwrap();
        assert_eq!(limiter.buckets.len(), 1);
        assert!(limiter.buckets.contains_key(&u64::MAX));
    }
}
