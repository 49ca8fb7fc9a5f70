//! Bounded retry with linear backoff
//!
//! Wraps a single-shot provider lookup in a bounded attempt loop. Only
//! transient failures (timeouts, connection failures, 429, 5xx) consume
//! retry slots; a `NotFound` or malformed body short-circuits immediately.

use std::time::Duration;

use tracing::warn;

use ceplote_common::{types::Address, Cep};

use crate::config::ProviderConfig;

use super::{CepProvider, ProviderError};

/// Retry bounds for one provider lookup.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Total attempts per provider per CEP, including the first
    pub max_attempts: u32,
    /// Base delay; attempt N waits N times this (linear backoff)
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn from_config(config: &ProviderConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.retry_delay_ms),
        )
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }
}

/// Look up a CEP with bounded retries against one provider.
///
/// Exhausting every attempt yields a terminal `Unavailable` for this
/// provider, whatever the last transient flavor was.
pub async fn lookup_with_retry(
    provider: &dyn CepProvider,
    cep: &Cep,
    policy: &RetryPolicy,
) -> Result<Address, ProviderError> {
    let mut last_error = ProviderError::Unavailable("no attempt made".to_string());

    for attempt in 1..=policy.max_attempts {
        match provider.lookup(cep).await {
            Ok(address) => return Ok(address),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => {
                warn!(
                    provider = provider.name(),
                    cep = cep.as_str(),
                    attempt,
                    max_attempts = policy.max_attempts,
                    error = %e,
                    "Lookup attempt failed"
                );
                last_error = e;

                if attempt < policy.max_attempts {
                    tokio::time::sleep(policy.delay_for(attempt)).await;
                }
            },
        }
    }

    Err(ProviderError::Unavailable(format!(
        "{} attempts exhausted, last error: {}",
        policy.max_attempts, last_error
    )))
}
