use crate::constants::RATE_LIMIT_MAX_WAIT_SECS;
use std::time::Duration;
use tokio::time::Instant;

/// Throttles one data transfer to a fixed bytes/second ceiling.
///
/// Accounting is cumulative: after each chunk the limiter computes how long
/// the total volume should have taken at the ceiling and sleeps off any
/// surplus, in bounded steps. A zero limit disables throttling.
pub struct RateLimiter {
    limit_bytes_per_sec: u64,
    transferred: u64,
    started: Option<Instant>,
}

impl RateLimiter {
    pub fn new(limit_bytes_per_sec: u64) -> Self {
        Self {
            limit_bytes_per_sec,
            transferred: 0,
            started: None,
        }
    }

    /// Records `bytes` and sleeps until the cumulative transfer is back
    /// under the ceiling.
    pub async fn throttle(&mut self, bytes: usize) {
        if self.limit_bytes_per_sec == 0 {
            return;
        }
        let started = *self.started.get_or_insert_with(Instant::now);
        self.transferred += bytes as u64;

        let expected =
            Duration::from_secs_f64(self.transferred as f64 / self.limit_bytes_per_sec as f64);
        loop {
            let elapsed = started.elapsed();
            if elapsed >= expected {
                break;
            }
            let wait =
                (expected - elapsed).min(Duration::from_secs(RATE_LIMIT_MAX_WAIT_SECS));
            tokio::time::sleep(wait).await;
        }
    }
}
