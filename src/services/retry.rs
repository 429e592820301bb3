use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// All attempts failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exhausted<E> {
    pub attempts: u32,
    pub last_error: E,
}

/// Bounded retry with a fixed delay between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// `attempts` is clamped to at least one.
    pub fn new(attempts: u32, backoff: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            backoff,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Run `op` until it succeeds or the budget is spent.
    ///
    /// On success returns the value and the 1-based attempt that produced it.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<(T, u32), Exhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok((value, attempt)),
                Err(e) => {
                    warn!(attempt, of = self.attempts, error = %e, "attempt failed");
                    if attempt >= self.attempts {
                        return Err(Exhausted {
                            attempts: attempt,
                            last_error: e,
                        });
                    }
                }
            }
            if !self.backoff.is_zero() {
                tokio::time::sleep(self.backoff).await;
            }
            attempt += 1;
        }
    }
}
