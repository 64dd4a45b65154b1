//! Bounded retry over an ordered list of transport strategies.
//!
//! Attempt `n` (1-based) runs on `strategies[min(n - 1, len - 1)]`, so with
//! `[primary, relaxed]` the first attempt uses the primary transport and every
//! later attempt uses the relaxed one. Between attempts the policy's backoff
//! schedule is slept.

use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Backoff {
    /// `step_ms * attempt`
    Linear { step_ms: u64 },
    /// `base_ms * 2^(attempt - 1)`, capped at `max_ms`
    Exponential { base_ms: u64, max_ms: u64 },
}

impl Backoff {
    /// Delay after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        let ms = match *self {
            Backoff::Linear { step_ms } => step_ms.saturating_mul(attempt as u64),
            Backoff::Exponential { base_ms, max_ms } => {
                let factor = 1u64.checked_shl(attempt - 1).unwrap_or(u64::MAX);
                base_ms.saturating_mul(factor).min(max_ms)
            }
        };
        Duration::from_millis(ms)
    }
}

/// How many times to try and how long to wait in between.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Backoff::Linear { step_ms: 400 },
        }
    }
}

impl RetryPolicy {
    /// A policy that tries exactly once.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }
}

/// Run `op` until it succeeds, the error is not retryable, or attempts run out.
///
/// `op` receives the strategy chosen for the attempt and the 1-based attempt
/// number. The last error is returned on exhaustion.
///
/// # Panics
///
/// Panics if `strategies` is empty.
pub async fn execute_with_retry<S, T, E, F, Fut>(
    policy: &RetryPolicy,
    strategies: &[S],
    is_retryable: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut(&S, u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    assert!(!strategies.is_empty(), "at least one transport strategy is required");

    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        let strategy = &strategies[(attempt as usize - 1).min(strategies.len() - 1)];
        match op(strategy, attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(e) if attempt < max_attempts && is_retryable(&e) => {
                let delay = policy.backoff.delay_after(attempt);
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "Attempt failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_linear_backoff() {
        let backoff = Backoff::Linear { step_ms: 400 };
        assert_eq!(backoff.delay_after(1), Duration::from_millis(400));
        assert_eq!(backoff.delay_after(2), Duration::from_millis(800));
    }

    #[test]
    fn test_exponential_backoff_is_capped() {
        let backoff = Backoff::Exponential { base_ms: 100, max_ms: 1000 };
        assert_eq!(backoff.delay_after(1), Duration::from_millis(100));
        assert_eq!(backoff.delay_after(3), Duration::from_millis(400));
        assert_eq!(backoff.delay_after(10), Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_attempt_switches_to_fallback_strategy() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();

        let result: Result<&str, String> = execute_with_retry(
            &RetryPolicy::default(),
            &["strict", "relaxed"],
            |_| true,
            |strategy, attempt| {
                log.lock().unwrap().push(*strategy);
                let strategy = *strategy;
                async move {
                    if attempt < 3 {
                        Err(format!("{} failed", strategy))
                    } else {
                        Ok(strategy)
                    }
                }
            },
        )
        .await;

        assert_eq!(result, Ok("relaxed"));
        assert_eq!(*seen.lock().unwrap(), vec!["strict", "relaxed", "relaxed"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_error() {
        let result: Result<(), String> = execute_with_retry(
            &RetryPolicy::default(),
            &[()],
            |_| true,
            |_, attempt| async move { Err(format!("attempt {}", attempt)) },
        )
        .await;

        assert_eq!(result, Err("attempt 3".to_string()));
    }

    #[tokio::test]
    async fn test_non_retryable_error_stops_immediately() {
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();

        let result: Result<(), String> = execute_with_retry(
            &RetryPolicy::default(),
            &[()],
            |e: &String| !e.contains("config"),
            |_, _| {
                *counter.lock().unwrap() += 1;
                async { Err("config missing".to_string()) }
            },
        )
        .await;

        assert!(result.is_err());
        assert_eq!(*calls.lock().unwrap(), 1);
    }
}
