//! AwesomeAPI client
//!
//! `GET {base}/json/{cep}`. Last in the fallback order. Signals not-found
//! with HTTP 404.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use ceplote_common::{types::Address, Cep};

use super::{clean_field, map_http_status, map_send_error, CepProvider, ProviderError};

pub struct AwesomeApi {
    client: Client,
    base_url: String,
}

impl AwesomeApi {
    pub fn new(client: Client, base_url: String) -> Self {
        Self { client, base_url }
    }
}

#[derive(Debug, Deserialize)]
struct AwesomeApiBody {
    address: Option<String>,
    district: Option<String>,
    city: Option<String>,
    state: Option<String>,
}

#[async_trait]
impl CepProvider for AwesomeApi {
    fn name(&self) -> &'static str {
        "AwesomeAPI"
    }

    async fn lookup(&self, cep: &Cep) -> Result<Address, ProviderError> {
        let url = format!("{}/json/{}", self.base_url, cep.as_str());

        let response = self.client.get(&url).send().await.map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(map_http_status(status));
        }

        let body: AwesomeApiBody = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        Ok(Address {
            street: clean_field(body.address),
            neighborhood: clean_field(body.district),
            city: clean_field(body.city),
            state: clean_field(body.state),
        })
    }
}
