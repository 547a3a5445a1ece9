use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket shared by every REST call of one client.
pub struct RateLimiter {
    bucket: Mutex<Bucket>,
    max_tokens: f64,
    refill_rate: f64,
}

impl RateLimiter {
    pub fn new(requests_per_second: f64) -> Self {
        let rate = requests_per_second.max(1.0);
        Self {
            bucket: Mutex::new(Bucket {
                tokens: rate,
                last_refill: Instant::now(),
            }),
            max_tokens: rate,
            refill_rate: rate,
        }
    }

    /// Wait until a request may be sent.
    pub async fn acquire(&self) {
        loop {
            {
                let mut bucket = self.bucket.lock().await;
                let now = Instant::now();
                let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
                bucket.tokens = (bucket.tokens + elapsed * self.refill_rate).min(self.max_tokens);
                bucket.last_refill = now;

                if bucket.tokens >= 1.0 {
                    bucket.tokens -= 1.0;
                    return;
                }
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    pub async fn available(&self) -> f64 {
        self.bucket.lock().await.tokens
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max_tokens", &self.max_tokens)
            .field("refill_rate", &self.refill_rate)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn burst_up_to_capacity_without_waiting() {
        let limiter = RateLimiter::new(5.0);
        let started = std::time::Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert!(started.elapsed() < POLL_INTERVAL);
        assert!(limiter.available().await < 1.0);
    }
}
