use std::time::Duration;

use async_trait::async_trait;

/// Pacing hook for multi-request operations such as full activity paging.
///
/// Called before every request after the first one.
#[async_trait]
pub trait Throttle: Send + Sync {
    async fn wait(&self);
}

/// Sleeps for a fixed interval between requests
#[derive(Debug, Clone, Copy)]
pub struct FixedInterval {
    interval: Duration,
}

impl FixedInterval {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

#[async_trait]
impl Throttle for FixedInterval {
    async fn wait(&self) {
        tokio::time::sleep(self.interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_interval_sleeps() {
        let throttle = FixedInterval::new(Duration::from_millis(20));
        let started = std::time::Instant::now();
        throttle.wait().await;
        assert!(started.elapsed() >= Duration::from_millis(20));
    }
}
