//! ViaCEP client
//!
//! `GET {base}/ws/{cep}/json/`. ViaCEP never answers 404 for an unknown
//! code: it returns HTTP 200 with `{"erro": true}` (the value is a string
//! in some deployments). That success-shaped failure is mapped to
//! [`ProviderError::NotFound`] right here so the fallback resolver stays
//! provider-agnostic.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use ceplote_common::{types::Address, Cep};

use super::{clean_field, map_http_status, map_send_error, CepProvider, ProviderError};

pub struct ViaCep {
    client: Client,
    base_url: String,
}

impl ViaCep {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[derive(Debug, Deserialize)]
struct ViaCepBody {
    /// Present (as `true` or `"true"`) only on the not-found answer
    #[serde(default)]
    erro: Option<serde_json::Value>,
    logradouro: Option<String>,
    bairro: Option<String>,
    localidade: Option<String>,
    uf: Option<String>,
}

impl ViaCepBody {
    fn is_erro(&self) -> bool {
        match &self.erro {
            Some(serde_json::Value::Bool(b)) => *b,
            Some(serde_json::Value::String(s)) => s == "true",
            Some(_) => true,
            None => false,
        }
    }
}

#[async_trait]
impl CepProvider for ViaCep {
    fn name(&self) -> &'static str {
        "ViaCEP"
    }

    async fn lookup(&self, cep: &Cep) -> Result<Address, ProviderError> {
        let url = format!("{}/ws/{}/json/", self.base_url, cep.as_str());

        let response = self.client.get(&url).send().await.map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_http_status(status));
        }

        let body: ViaCepBody = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        if body.is_erro() {
            return Err(ProviderError::NotFound);
        }

        Ok(Address {
            street: clean_field(body.logradouro),
            neighborhood: clean_field(body.bairro),
            city: clean_field(body.localidade),
            state: clean_field(body.uf),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_erro_marker_variants() {
        let body: ViaCepBody = serde_json::from_str(r#"{"erro": true}"#).unwrap();
        assert!(body.is_erro());

        let body: ViaCepBody = serde_json::from_str(r#"{"erro": "true"}"#).unwrap();
        assert!(body.is_erro());

        let body: ViaCepBody =
            serde_json::from_str(r#"{"logradouro": "Praça da Sé", "uf": "SP"}"#).unwrap();
        assert!(!body.is_erro());
    }
}
