//! CEP provider clients
//!
//! One module per external provider, each mapping its own response field
//! names into the shared [`Address`] shape. Callers above this layer never
//! see provider-specific naming, and success-shaped failures (ViaCEP's
//! HTTP 200 with an `"erro"` body) are normalized into [`ProviderError`]
//! here, not in the fallback resolver.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use thiserror::Error;

use ceplote_common::{types::Address, Cep};

use crate::config::ProviderConfig;

pub mod awesome_api;
pub mod brasil_api;
pub mod retry;
pub mod via_cep;

pub use awesome_api::AwesomeApi;
pub use brasil_api::BrasilApi;
pub use retry::{lookup_with_retry, RetryPolicy};
pub use via_cep::ViaCep;

/// Typed failure of one lookup against one provider.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider affirmatively reports the code does not exist
    #[error("CEP not found")]
    NotFound,

    /// Transient network / 429 / 5xx failure
    #[error("Provider unavailable: {0}")]
    Unavailable(String),

    /// The request timed out
    #[error("Provider timed out")]
    Timeout,

    /// The provider answered with something unparseable or unexpected
    #[error("Malformed provider response: {0}")]
    Malformed(String),
}

impl ProviderError {
    /// Only transient failures are worth another attempt; a `NotFound` or a
    /// malformed body will not get better on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::Unavailable(_) | ProviderError::Timeout)
    }
}

/// One external CEP provider.
#[async_trait]
pub trait CepProvider: Send + Sync {
    /// Display name, e.g. `"BrasilAPI"`
    fn name(&self) -> &'static str;

    /// One HTTP GET against the provider; no retries at this layer.
    async fn lookup(&self, cep: &Cep) -> Result<Address, ProviderError>;
}

/// Shared HTTP client with the per-request provider timeout applied.
pub fn build_http_client(timeout_secs: u64) -> reqwest::Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("ceplote/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// All configured providers in fallback priority order.
pub fn default_providers(
    config: &ProviderConfig,
    client: Client,
) -> Vec<Arc<dyn CepProvider>> {
    vec![
        Arc::new(BrasilApi::new(client.clone(), config.brasilapi_base_url.clone())),
        Arc::new(ViaCep::new(client.clone(), config.viacep_base_url.clone())),
        Arc::new(AwesomeApi::new(client, config.awesomeapi_base_url.clone())),
    ]
}

/// Map a reqwest transport failure into the taxonomy.
pub(crate) fn map_send_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout
    } else {
        ProviderError::Unavailable(err.to_string())
    }
}

/// Map a non-200 HTTP status into the taxonomy.
///
/// Providers here all signal not-found with 404 (ViaCEP's body-level marker
/// is handled in its own client). 429 and 5xx are transient; any other
/// status means the request itself was wrong and retrying will not help.
pub(crate) fn map_http_status(status: StatusCode) -> ProviderError {
    if status == StatusCode::NOT_FOUND {
        ProviderError::NotFound
    } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        ProviderError::Unavailable(format!("HTTP {status}"))
    } else {
        ProviderError::Malformed(format!("unexpected HTTP {status}"))
    }
}

/// Empty-string fields from provider JSON become `None`.
pub(crate) fn clean_field(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(ProviderError::Timeout.is_retryable());
        assert!(ProviderError::Unavailable("HTTP 503".into()).is_retryable());
        assert!(!ProviderError::NotFound.is_retryable());
        assert!(!ProviderError::Malformed("bad json".into()).is_retryable());
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(map_http_status(StatusCode::NOT_FOUND), ProviderError::NotFound);
        assert!(matches!(
            map_http_status(StatusCode::TOO_MANY_REQUESTS),
            ProviderError::Unavailable(_)
        ));
        assert!(matches!(
            map_http_status(StatusCode::BAD_GATEWAY),
            ProviderError::Unavailable(_)
        ));
        assert!(matches!(
            map_http_status(StatusCode::FORBIDDEN),
            ProviderError::Malformed(_)
        ));
    }

    #[test]
    fn test_clean_field() {
        assert_eq!(clean_field(Some("Rua A".into())), Some("Rua A".to_string()));
        assert_eq!(clean_field(Some("  ".into())), None);
        assert_eq!(clean_field(Some(String::new())), None);
        assert_eq!(clean_field(None), None);
    }

    #[test]
    fn test_default_providers_priority_order() {
        let config = ProviderConfig {
            brasilapi_base_url: "http://a".into(),
            viacep_base_url: "http://b".into(),
            awesomeapi_base_url: "http://c".into(),
            timeout_secs: 1,
            max_attempts: 1,
            retry_delay_ms: 0,
        };
        let client = build_http_client(1).unwrap();
        let providers = default_providers(&config, client);
        let names: Vec<_> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, ["BrasilAPI", "ViaCEP", "AwesomeAPI"]);
    }
}
