//! BrasilAPI client
//!
//! `GET {base}/api/cep/v2/{cep}`. First in the fallback order: fastest and
//! the most complete field coverage of the three. Signals not-found with a
//! plain HTTP 404.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use ceplote_common::{types::Address, Cep};

use super::{clean_field, map_http_status, map_send_error, CepProvider, ProviderError};

pub struct BrasilApi {
    client: Client,
    base_url: String,
}

impl BrasilApi {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[derive(Debug, Deserialize)]
struct BrasilApiBody {
    street: Option<String>,
    neighborhood: Option<String>,
    city: Option<String>,
    state: Option<String>,
}

#[async_trait]
impl CepProvider for BrasilApi {
    fn name(&self) -> &'static str {
        "BrasilAPI"
    }

    async fn lookup(&self, cep: &Cep) -> Result<Address, ProviderError> {
        let url = format!("{}/api/cep/v2/{}", self.base_url, cep.as_str());

        let response = self.client.get(&url).send().await.map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_http_status(status));
        }

        let body: BrasilApiBody = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(Address {
            street: clean_field(body.street),
            neighborhood: clean_field(body.neighborhood),
            city: clean_field(body.city),
            state: clean_field(body.state),
        })
    }
}
