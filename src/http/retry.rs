//! Retriability classification and the backoff schedule between attempts.

use std::time::Duration;

use super::error::Error;

/// Delay before the first retry, in milliseconds.
pub const BASE_DELAY_MS: u64 = 250;

/// Upper bound for any single backoff delay, in milliseconds.
pub const MAX_DELAY_MS: u64 = 5_000;

/// Status 0 stands for "no response" (timeout or transport failure).
pub fn is_retriable_status(status: u16) -> bool {
    status == 0 || status >= 500
}

/// Decides whether a failed attempt may be tried again.
///
/// Only structured API errors are ever retried. Everything else was raised
/// while building the request or decoding the payload and would fail the
/// same way on every attempt.
pub fn is_retriable(error: &Error) -> bool {
    match error {
        Error::Api(api) => api.is_retriable(),
        Error::InvalidRequest(_) | Error::Decode(_) => false,
    }
}

/// Exponential backoff without jitter: `min(base * 2^attempt, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(BASE_DELAY_MS),
            max: Duration::from_millis(MAX_DELAY_MS),
        }
    }
}

impl Backoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self { base, max }
    }

    /// Delay to wait after `attempt` (0-indexed) has failed.
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base.saturating_mul(factor).min(self.max)
    }
}

/// How many attempts a logical call gets and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    retries: u32,
    backoff: Backoff,
}

impl RetryPolicy {
    pub fn new(retries: u32) -> Self {
        Self {
            retries,
            backoff: Backoff::default(),
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Total physical attempts: the retry count plus the first try.
    pub fn attempts(&self) -> u64 {
        u64::from(self.retries) + 1
    }

    pub fn delay(&self, attempt: u64) -> Duration {
        self.backoff.delay(u32::try_from(attempt).unwrap_or(u32::MAX))
    }
}
