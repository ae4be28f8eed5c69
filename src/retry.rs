// Copyright (c) 2024 The Botho Foundation

//! Exponential backoff for async operations.
//!
//! Domain-independent: the unit of work, the give-up bound, and the
//! per-attempt failure hook are all supplied by the caller. The engine
//! uses this to drive validation, but nothing here knows about probes.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

/// When to stop retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GiveUp {
    /// Stop after this many failed attempts.
    Attempts(u32),
    /// Stop once this much time has passed since the first attempt.
    Elapsed(Duration),
}

/// Backoff parameters. Stateless; each `retry_with_backoff` call starts
/// a fresh cursor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Delay before the second attempt.
    pub base_delay: Duration,
    /// Growth factor applied to the delay after every failed attempt.
    pub multiplier: f64,
    pub give_up: GiveUp,
}

impl Default for RetryPolicy {
    /// Roughly a day of patience: nodes can spend a long time syncing a
    /// chain before they answer status calls.
    fn default() -> Self {
        Self {
            base_delay: Duration::from_secs(5),
            multiplier: 1.5,
            give_up: GiveUp::Attempts(24),
        }
    }
}

impl GiveUp {
    fn reached(&self, attempts: u32, elapsed: Duration) -> bool {
        match self {
            GiveUp::Attempts(max) => attempts >= *max,
            GiveUp::Elapsed(max) => elapsed >= *max,
        }
    }
}

/// The retry bound was exceeded; carries the final failure.
#[derive(Debug)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

impl<E: fmt::Display> fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gave up after {} attempts, last error: {}",
            self.attempts, self.last_error
        )
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryExhausted<E> {}

/// Run `operation` until it succeeds or the policy's bound is reached.
///
/// `on_attempt_failure` is invoked with the error and the 1-based
/// attempt number after every failed attempt, including the last one.
/// Exhaustion is returned, not raised per attempt; the caller decides
/// whether it is fatal.
pub async fn retry_with_backoff<Op, Fut, E, F>(
    mut operation: Op,
    policy: &RetryPolicy,
    mut on_attempt_failure: F,
) -> Result<(), RetryExhausted<E>>
where
    Op: FnMut() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    F: FnMut(&E, u32),
{
    let started = Instant::now();
    let mut delay = policy.base_delay;
    let mut attempts = 0u32;

    loop {
        attempts += 1;
        match operation().await {
            Ok(()) => return Ok(()),
            Err(error) => {
                on_attempt_failure(&error, attempts);
                if policy.give_up.reached(attempts, started.elapsed()) {
                    return Err(RetryExhausted {
                        attempts,
                        last_error: error,
                    });
                }
            }
        }

        tokio::time::sleep(delay).await;
        delay = delay.mul_f64(policy.multiplier);
    }
}
