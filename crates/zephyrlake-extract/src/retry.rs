// Retry policy as an explicit state machine
//
// The transition function is pure over (status, attempt), so the policy is
// testable without any network mocking. The extractor only executes the
// delays the machine hands back.

use std::time::Duration;

/// HTTP statuses worth retrying with the same request.
pub const RETRYABLE_STATUSES: &[u16] = &[429, 500, 502, 503, 504];

pub fn is_retryable(status: u16) -> bool {
    RETRYABLE_STATUSES.contains(&status)
}

/// State of one page fetch. Attempt numbers are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// About to issue attempt `attempt`.
    Attempting { attempt: u32 },
    /// Waiting `delay` before issuing attempt `next_attempt`.
    Backoff { next_attempt: u32, delay: Duration },
    Succeeded,
    /// Terminal failure: non-retryable status, or schedule exhausted.
    FailedPermanently { status: u16, attempts: u32 },
}

impl RetryState {
    pub fn initial() -> Self {
        Self::Attempting { attempt: 1 }
    }

    /// Leave a `Backoff` state once its delay has elapsed.
    pub fn after_backoff(self) -> Self {
        match self {
            Self::Backoff { next_attempt, .. } => Self::Attempting {
                attempt: next_attempt,
            },
            other => other,
        }
    }
}

/// Fixed escalating backoff schedule: one retry per delay entry after the
/// first attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

impl RetryPolicy {
    pub fn new(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    /// Total attempts the schedule allows per page.
    pub fn max_attempts(&self) -> u32 {
        self.delays.len() as u32 + 1
    }

    /// Pure transition: outcome of attempt `attempt` returning `status`.
    pub fn on_status(&self, status: u16, attempt: u32) -> RetryState {
        if (200..300).contains(&status) {
            return RetryState::Succeeded;
        }

        if !is_retryable(status) {
            return RetryState::FailedPermanently {
                status,
                attempts: attempt,
            };
        }

        match self.delays.get(attempt as usize - 1) {
            Some(delay) => RetryState::Backoff {
                next_attempt: attempt + 1,
                delay: *delay,
            },
            None => RetryState::FailedPermanently {
                status,
                attempts: attempt,
            },
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(vec![
            Duration::from_secs(1),
            Duration::from_secs(2),
            Duration::from_secs(3),
        ])
    }
}
