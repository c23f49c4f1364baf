use std::time::Duration;

/// Decides whether a failed pass gets an early retry before the next tick.
pub trait RetryPolicy: Send + Sync {
    /// `consecutive_failures` starts at 1. `None` means wait for the next
    /// regular tick.
    fn on_failure(&mut self, consecutive_failures: u32) -> Option<Duration>;

    fn on_success(&mut self) {}
}

/// Retry only on the regular schedule.
#[derive(Debug, Clone, Copy, Default)]
pub struct NextTick;

impl RetryPolicy for NextTick {
    fn on_failure(&mut self, _consecutive_failures: u32) -> Option<Duration> {
        None
    }
}

/// Early retries after `base`, `2 * base`, `4 * base`... capped at `max`,
/// for at most `max_attempts` failures in a row.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    pub base: Duration,
    pub max: Duration,
    pub max_attempts: u32,
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self {
            base: Duration::from_secs(2),
            max: Duration::from_secs(30),
            max_attempts: 3,
        }
    }
}

impl RetryPolicy for ExponentialBackoff {
    fn on_failure(&mut self, consecutive_failures: u32) -> Option<Duration> {
        if consecutive_failures == 0 || consecutive_failures > self.max_attempts {
            return None;
        }
        let factor = 2u32.saturating_pow(consecutive_failures - 1);
        Some(self.base.saturating_mul(factor).min(self.max))
    }
}
