//! Multi-provider fallback resolution
//!
//! Tries providers sequentially in priority order, stopping at the first
//! success. Sequential order keeps a struggling provider from compounding
//! rate-limit pressure on the others. Per-CEP failures never surface as
//! `Err` from here: the resolver always returns a [`Resolution`] value so
//! one bad code can never abort a batch.

use std::sync::Arc;

use tracing::{debug, warn};

use ceplote_common::{types::Address, Cep};

use crate::providers::{lookup_with_retry, CepProvider, ProviderError, RetryPolicy};

/// Terminal classification of one postal code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A provider answered; carries the winning provider's name
    Success { provider: &'static str },
    /// At least one provider affirmatively reported the code does not exist
    NotFound,
    /// Every provider exhausted its retries without an affirmative answer
    Unreachable,
    /// Failed normalization; never sent to any provider
    InvalidFormat,
}

/// The single per-code result every row sharing that code reuses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub address: Address,
    pub outcome: Outcome,
}

impl Resolution {
    pub fn invalid_format() -> Self {
        Self {
            address: Address::default(),
            outcome: Outcome::InvalidFormat,
        }
    }

    /// The output status string, in the business vocabulary the downstream
    /// review flows key on.
    pub fn status_label(&self) -> String {
        match &self.outcome {
            Outcome::Success { provider } => format!("{provider}: Sucesso"),
            Outcome::NotFound => "CEP Inválido".to_string(),
            Outcome::Unreachable => "FALHA TOTAL".to_string(),
            Outcome::InvalidFormat => "Formato de CEP Inválido".to_string(),
        }
    }
}

/// Tries providers in fixed priority order for one postal code.
pub struct FallbackResolver {
    providers: Vec<Arc<dyn CepProvider>>,
    retry: RetryPolicy,
}

impl FallbackResolver {
    pub fn new(providers: Vec<Arc<dyn CepProvider>>, retry: RetryPolicy) -> Self {
        Self { providers, retry }
    }

    pub fn providers(&self) -> &[Arc<dyn CepProvider>] {
        &self.providers
    }

    /// Resolve one normalized CEP through the provider chain.
    pub async fn resolve(&self, cep: &Cep) -> Resolution {
        let mut saw_not_found = false;

        for provider in &self.providers {
            match lookup_with_retry(provider.as_ref(), cep, &self.retry).await {
                Ok(address) => {
                    debug!(cep = cep.as_str(), provider = provider.name(), "CEP resolved");
                    return Resolution {
                        address,
                        outcome: Outcome::Success {
                            provider: provider.name(),
                        },
                    };
                },
                Err(ProviderError::NotFound) => {
                    debug!(
                        cep = cep.as_str(),
                        provider = provider.name(),
                        "Provider reports CEP does not exist"
                    );
                    saw_not_found = true;
                },
                Err(e) => {
                    warn!(
                        cep = cep.as_str(),
                        provider = provider.name(),
                        error = %e,
                        "Provider failed, falling back"
                    );
                },
            }
        }

        // "Does not exist" and "nobody answered" feed different review
        // queues downstream, so keep them apart.
        let outcome = if saw_not_found {
            Outcome::NotFound
        } else {
            Outcome::Unreachable
        };

        Resolution {
            address: Address::default(),
            outcome,
        }
    }
}
