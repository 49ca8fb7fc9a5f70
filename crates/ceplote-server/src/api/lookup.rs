//! Interactive lookup routes
//!
//! Single-CEP comparison across all providers and the provider health
//! dashboard. Both query every provider concurrently with no retry wrapper:
//! interactive latency matters more than resilience here, the batch path
//! keeps its retries.

use std::time::Instant;

use axum::extract::{Path, State};
use futures::future::join_all;

use ceplote_common::types::{CepLookup, ProviderAnswer, ProviderHealth, ProviderState};
use ceplote_common::Cep;

use crate::error::{ApiResult, AppError};
use crate::providers::{CepProvider, ProviderError};

use super::response::ApiResponse;
use super::ApiState;

/// Praça da Sé. A CEP guaranteed to exist, used as the health reference.
const REFERENCE_CEP: &str = "01001000";

/// GET /api/v1/cep/:code: one answer per provider for an operator to compare.
pub async fn lookup_cep(
    State(state): State<ApiState>,
    Path(code): Path<String>,
) -> ApiResult<ApiResponse<CepLookup>> {
    let cep = Cep::normalize(&code)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let probes = state.resolver.providers().iter().map(|provider| {
        let cep = cep.clone();
        async move {
            let started = Instant::now();
            let result = provider.lookup(&cep).await;
            let latency_ms = started.elapsed().as_millis() as u64;

            let (status, address) = match result {
                Ok(address) => ("Sucesso".to_string(), Some(address)),
                Err(ProviderError::NotFound) => ("Não encontrado".to_string(), None),
                Err(_) => ("Serviço indisponível".to_string(), None),
            };

            ProviderAnswer {
                provider: provider.name().to_string(),
                status,
                address,
                latency_ms,
            }
        }
    });

    let answers = join_all(probes).await;

    Ok(ApiResponse::success(CepLookup {
        cep: cep.as_str().to_string(),
        answers,
    }))
}

/// GET /api/v1/providers/status: probe every provider with the reference CEP.
pub async fn provider_status(
    State(state): State<ApiState>,
) -> ApiResult<ApiResponse<Vec<ProviderHealth>>> {
    // REFERENCE_CEP is a compile-time constant 8-digit code.
    let cep = Cep::normalize(REFERENCE_CEP)
        .map_err(|e| AppError::Internal(e.to_string()))?;

    let probes = state.resolver.providers().iter().map(|provider| {
        let cep = cep.clone();
        async move { probe(provider.as_ref(), &cep).await }
    });

    Ok(ApiResponse::success(join_all(probes).await))
}

async fn probe(provider: &dyn CepProvider, cep: &Cep) -> ProviderHealth {
    let started = Instant::now();
    let result = provider.lookup(cep).await;
    let latency_ms = started.elapsed().as_millis() as u64;

    // Not-found or malformed for a CEP known to exist means the provider is
    // reachable but answering wrong.
    let state = match result {
        Ok(_) => ProviderState::Online,
        Err(ProviderError::NotFound) | Err(ProviderError::Malformed(_)) => ProviderState::Degraded,
        Err(ProviderError::Unavailable(_)) | Err(ProviderError::Timeout) => ProviderState::Offline,
    };

    ProviderHealth {
        provider: provider.name().to_string(),
        state,
        latency_ms,
    }
}
