//! Rate-limit retry policy.

use std::time::Duration;

use reqwest::StatusCode;

/// Status that makes the dispatcher re-execute a request.
pub const RATE_LIMIT_STATUS: StatusCode = StatusCode::TOO_MANY_REQUESTS;

/// How the dispatcher reacts to [`RATE_LIMIT_STATUS`].
///
/// The default retries immediately and without limit until the server answers
/// with another status. Under sustained throttling that keeps the calling task
/// busy forever; set [`with_max_attempts`](Self::with_max_attempts) to cap it.
/// When the cap is reached the last rate-limited response goes to the content
/// handler like any other status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitPolicy {
    max_attempts: Option<usize>,
    delay: Duration,
}

impl RateLimitPolicy {
    /// Unbounded, immediate retry.
    pub const fn unbounded() -> Self {
        Self {
            max_attempts: None,
            delay: Duration::ZERO,
        }
    }

    /// Caps the total number of executions per call, first attempt included.
    /// A value of zero is treated as one.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts.max(1));
        self
    }

    /// Waits `delay` before each re-execution.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn max_attempts(&self) -> Option<usize> {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether a response with `status`, received on attempt number `attempt`
    /// (1-based), should be discarded and the request executed again.
    pub fn should_retry(&self, status: StatusCode, attempt: usize) -> bool {
        status == RATE_LIMIT_STATUS && self.max_attempts.is_none_or(|max| attempt < max)
    }
}
