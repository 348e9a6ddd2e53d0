//! Retry policy and request correlation

use std::time::Duration;

use jobportal_domain::constants::{
    DEFAULT_BACKOFF_STEP_MS, DEFAULT_MAX_ATTEMPTS, REQUEST_ID_LENGTH,
};
use jobportal_domain::ApiConfig;
use rand::distributions::Alphanumeric;
use rand::Rng;

/// Bounded retry with linear backoff: `backoff(n) = step * n`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, Duration::from_millis(DEFAULT_BACKOFF_STEP_MS))
    }
}

impl RetryPolicy {
    /// `max_attempts` counts the initial try; values below 1 are raised to 1.
    pub fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), backoff_step }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.backoff_step_ms))
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after failed attempt `attempt` (1-indexed)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_step.saturating_mul(attempt)
    }

    pub const fn is_last(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }
}

/// Short random id shared by every attempt of one logical call
pub fn new_request_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REQUEST_ID_LENGTH)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_is_linear_in_attempt_number() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff(2), Duration::from_millis(2000));
        assert_eq!(policy.max_attempts(), 3);
    }

    #[test]
    fn last_attempt_detection() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        assert!(!policy.is_last(1));
        assert!(!policy.is_last(2));
        assert!(policy.is_last(3));
    }

    #[test]
    fn zero_attempts_is_clamped() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        assert_eq!(policy.max_attempts(), 1);
        assert!(policy.is_last(1));
    }

    #[test]
    fn reads_policy_from_config() {
        let config = ApiConfig { max_attempts: 5, backoff_step_ms: 250, ..ApiConfig::default() };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts(), 5);
        assert_eq!(policy.backoff(2), Duration::from_millis(500));
    }

    #[test]
    fn request_ids_are_short_and_distinct() {
        let first = new_request_id();
        let second = new_request_id();
        assert_eq!(first.len(), REQUEST_ID_LENGTH);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }
}
