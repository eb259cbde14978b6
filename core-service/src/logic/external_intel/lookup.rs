//! Best-effort lookup wrapper
//!
//! Every external signal goes through [`best_effort`]: bounded by one
//! deadline (retries included), and any failure turns into the caller's
//! fallback value plus an outcome for the report.

use std::future::Future;
use std::time::Duration;

use super::types::{Signal, SignalError, SignalOutcome};
use crate::logic::config::LookupConfig;

/// Deadline and retry budget for one lookup
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &LookupConfig) -> Self {
        Self {
            timeout: config.timeout,
            max_retries: config.max_retries,
            backoff: config.retry_backoff,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&LookupConfig::default())
    }
}

/// A looked-up value and how it was obtained
#[derive(Debug, Clone, PartialEq)]
pub struct Lookup<T> {
    pub value: T,
    pub outcome: SignalOutcome,
}

impl<T> Lookup<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        Lookup { value: f(self.value), outcome: self.outcome }
    }
}

/// Run `attempt` until it succeeds, fails permanently, exhausts its retries
/// or hits the deadline; anything but success yields `fallback`.
pub async fn best_effort<T, F, Fut>(
    signal: Signal,
    policy: RetryPolicy,
    fallback: T,
    mut attempt: F,
) -> Lookup<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SignalError>>,
{
    let run = async {
        let mut retries = 0;
        let mut backoff = policy.backoff;
        loop {
            match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && retries < policy.max_retries => {
                    retries += 1;
                    log::debug!(
                        "{} lookup failed ({}), retry {}/{} in {:?}",
                        signal, e, retries, policy.max_retries, backoff
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = backoff.saturating_mul(2);
                }
                Err(e) => return Err(e),
            }
        }
    };

    let error = match tokio::time::timeout(policy.timeout, run).await {
        Ok(Ok(value)) => {
            return Lookup { value, outcome: SignalOutcome::Ok };
        }
        Ok(Err(e)) => e,
        Err(_) => SignalError::Timeout,
    };

    match error {
        SignalError::MissingCredentials => log::debug!("{} lookup skipped: {}", signal, error),
        _ => log::warn!("{} lookup unavailable ({}), using fallback", signal, error),
    }

    Lookup { value: fallback, outcome: SignalOutcome::from(&error) }
}
