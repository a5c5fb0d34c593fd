//! Reservation-based rate limiter for provider calls
//!
//! Each caller reserves a distinct future slot while holding the lock, so
//! concurrent aggregations never fire two requests inside one interval.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

#[derive(Debug)]
pub struct RateLimiter {
    name: String,
    min_interval: Duration,
    next_available: Mutex<Option<Instant>>,
}

impl RateLimiter {
    pub fn new(name: impl Into<String>, min_interval: Duration) -> Self {
        Self {
            name: name.into(),
            min_interval,
            next_available: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Reserve the next slot if it opens within `max_wait`.
    ///
    /// Returns how long the caller must wait before issuing its request, or
    /// `None` (nothing reserved) when the slot lies beyond `max_wait`.
    pub async fn try_reserve(&self, max_wait: Duration) -> Option<Duration> {
        let now = Instant::now();
        let mut next = self.next_available.lock().await;

        let slot = match *next {
            Some(at) if at > now => at,
            _ => now,
        };
        let wait = slot.saturating_duration_since(now);

        if wait > max_wait {
            debug!(
                limiter = %self.name,
                wait_ms = wait.as_millis() as u64,
                max_wait_ms = max_wait.as_millis() as u64,
                "rate limit slot beyond deadline, skipping"
            );
            return None;
        }

        *next = Some(slot + self.min_interval);
        Some(wait)
    }
}
