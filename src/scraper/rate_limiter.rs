//! Request pacing: token bucket plus a jittered politeness delay.
//!
//! The portal tolerates slow, irregular clients and throttles fast ones, so
//! every request first takes a token from the bucket and then sleeps a random
//! amount inside the configured delay band.

use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// Token-bucket limiter shared across crawl tasks.
pub struct RateLimiter {
    inner: Arc<Mutex<Bucket>>,
    delay_min: Duration,
    delay_max: Duration,
}

struct Bucket {
    tokens: f64,
    capacity: f64,
    refill_per_sec: f64,
    refilled_at: Instant,
}

impl RateLimiter {
    /// Build a limiter allowing `requests_per_minute` sustained throughput,
    /// sleeping between `delay_min_secs` and `delay_max_secs` before each
    /// request.
    pub fn new(requests_per_minute: u32, delay_min_secs: f64, delay_max_secs: f64) -> Self {
        let capacity = f64::from(requests_per_minute.max(1));
        let delay_min = delay_min_secs.max(0.0);
        let delay_max = delay_max_secs.max(delay_min);
        Self {
            inner: Arc::new(Mutex::new(Bucket {
                tokens: capacity,
                capacity,
                refill_per_sec: capacity / 60.0,
                refilled_at: Instant::now(),
            })),
            delay_min: Duration::from_secs_f64(delay_min),
            delay_max: Duration::from_secs_f64(delay_max),
        }
    }

    /// Take a token, sleeping until one is available plus the politeness
    /// delay.
    pub async fn acquire(&self) {
        let wait = {
            let mut bucket = self.inner.lock().await;

            let now = Instant::now();
            let elapsed = now.duration_since(bucket.refilled_at).as_secs_f64();
            bucket.tokens = (bucket.tokens + elapsed * bucket.refill_per_sec).min(bucket.capacity);
            bucket.refilled_at = now;

            if bucket.tokens >= 1.0 {
                bucket.tokens -= 1.0;
                self.jittered_delay()
            } else {
                let until_token = (1.0 - bucket.tokens) / bucket.refill_per_sec;
                bucket.tokens = 0.0;
                Duration::from_secs_f64(until_token) + self.delay_min
            }
        };

        tokio::time::sleep(wait).await;
    }

    fn jittered_delay(&self) -> Duration {
        let band = self.delay_max.saturating_sub(self.delay_min);
        self.delay_min + band.mul_f64(jitter())
    }
}

/// Pseudo-random factor in [0.0, 1.0) from the clock's sub-second nanos.
fn jitter() -> f64 {
    use std::time::SystemTime;
    let nanos = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    f64::from(nanos % 1_000) / 1_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_acquire_within_capacity_is_fast() {
        let limiter = RateLimiter::new(600, 0.0, 0.0);
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_acquire_applies_minimum_delay() {
        let limiter = RateLimiter::new(600, 0.05, 0.05);
        let start = Instant::now();
        limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_jitter_in_unit_range() {
        for _ in 0..100 {
            let j = jitter();
            assert!((0.0..1.0).contains(&j));
        }
    }
}
