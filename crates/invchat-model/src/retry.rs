//! Bounded retry with exponential backoff.

use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::Result;

/// How often, and how patiently, a failed request is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 = try once).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Factor applied to the delay after every retry.
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff: Duration::from_millis(500),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Delay before retry number `retry` (0-based).
    pub fn backoff_for(&self, retry: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(self.multiplier.saturating_pow(retry))
    }

    /// Run `op`, retrying retryable errors up to `max_retries` times.
    ///
    /// Non-retryable errors and the error of the last attempt are returned
    /// unchanged.
    pub fn run<T, F>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Result<T>,
    {
        let mut retry = 0;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && retry < self.max_retries => {
                    let delay = self.backoff_for(retry);
                    warn!(
                        "Model request failed ({}), retry {}/{} in {:?}",
                        e,
                        retry + 1,
                        self.max_retries,
                        delay
                    );
                    thread::sleep(delay);
                    retry += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ModelError;

    fn instant() -> RetryPolicy {
        RetryPolicy::default().with_initial_backoff(Duration::ZERO)
    }

    #[test]
    fn test_backoff_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_for(0), Duration::from_millis(500));
        assert_eq!(policy.backoff_for(1), Duration::from_millis(1000));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(2000));
    }

    #[test]
    fn test_succeeds_after_transient_failures() {
        let mut calls = 0;
        let result = instant().run(|| {
            calls += 1;
            if calls < 3 {
                Err(ModelError::Timeout)
            } else {
                Ok("done")
            }
        });

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_gives_up_after_max_retries() {
        let mut calls = 0;
        let result: Result<()> = instant().run(|| {
            calls += 1;
            Err(ModelError::Status { status: 503, body: "busy".into() })
        });

        assert!(matches!(result, Err(ModelError::Status { status: 503, .. })));
        assert_eq!(calls, 3);
    }

    #[test]
    fn test_does_not_retry_client_errors() {
        let mut calls = 0;
        let result: Result<()> = instant().run(|| {
            calls += 1;
            Err(ModelError::Status { status: 400, body: "bad request".into() })
        });

        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_none_tries_once() {
        let mut calls = 0;
        let _: Result<()> = RetryPolicy::none().run(|| {
            calls += 1;
            Err(ModelError::Timeout)
        });
        assert_eq!(calls, 1);
    }
}
