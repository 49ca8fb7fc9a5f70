//! HTTP API client for the Ceplote server

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;

use ceplote_common::types::{CepLookup, JobDetail, JobSummary, ProviderHealth};

use crate::api::{endpoints, types::*};
use crate::error::{CliError, Result};

// ============================================================================
// API Client Constants
// ============================================================================

/// Default timeout for API requests in seconds.
/// Can be overridden via CEPLOTE_API_TIMEOUT_SECS environment variable.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 60;

/// Default server URL when not specified via environment variable.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

/// API client for the Ceplote server
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: String) -> Result<Self> {
        let timeout_secs = std::env::var("CEPLOTE_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_API_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("CEPLOTE_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());

        Self::new(base_url)
    }

    /// Check server health
    pub async fn health_check(&self) -> Result<bool> {
        let url = endpoints::health_url(&self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Upload a spreadsheet as a new job
    pub async fn upload(&self, file_path: &Path) -> Result<JobSummary> {
        let bytes = tokio::fs::read(file_path)
            .await
            .map_err(|_| CliError::FileNotFound(file_path.display().to_string()))?;

        let filename = file_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.csv".to_string());

        let part = Part::bytes(bytes)
            .file_name(filename)
            .mime_str("text/csv")?;
        let form = Form::new().part("file", part);

        let url = endpoints::jobs_url(&self.base_url);
        let response = self.send(self.client.post(&url).multipart(form)).await?;

        self.decode(response).await
    }

    /// List all jobs, newest first
    pub async fn list_jobs(&self) -> Result<Vec<JobSummary>> {
        let url = endpoints::jobs_url(&self.base_url);
        let response = self.send(self.client.get(&url)).await?;

        self.decode(response).await
    }

    /// Get one job in detail
    pub async fn get_job(&self, id: i64) -> Result<JobDetail> {
        let url = endpoints::job_url(&self.base_url, id);
        let response = self.send(self.client.get(&url)).await?;

        self.decode(response).await
    }

    /// The currently running job, if any
    pub async fn active_job(&self) -> Result<Option<JobSummary>> {
        let url = endpoints::active_job_url(&self.base_url);
        let response = self.send(self.client.get(&url)).await?;

        self.decode(response).await
    }

    /// Trigger the next queued job.
    ///
    /// A 409 (something is already running) and a 404 (empty queue) each get
    /// their own error variant so the commands can phrase them properly.
    pub async fn run_next(&self) -> Result<JobSummary> {
        let url = endpoints::run_next_url(&self.base_url);
        let response = self.send(self.client.post(&url)).await?;

        match response.status() {
            StatusCode::CONFLICT => {
                let message = error_message(response).await;
                Err(CliError::JobAlreadyRunning(message))
            }
            StatusCode::NOT_FOUND => Err(CliError::QueueEmpty),
            _ => self.decode(response).await,
        }
    }

    /// Download a job's results CSV as raw bytes
    pub async fn export(&self, id: i64) -> Result<Vec<u8>> {
        let url = endpoints::export_url(&self.base_url, id);
        let response = self.send(self.client.get(&url)).await?;

        if !response.status().is_success() {
            return Err(CliError::Api(error_message(response).await));
        }

        Ok(response.bytes().await?.to_vec())
    }

    /// Look up one CEP across every provider
    pub async fn lookup(&self, cep: &str) -> Result<CepLookup> {
        let url = endpoints::lookup_url(&self.base_url, cep);
        let response = self.send(self.client.get(&url)).await?;

        self.decode(response).await
    }

    /// Provider health dashboard
    pub async fn provider_status(&self) -> Result<Vec<ProviderHealth>> {
        let url = endpoints::provider_status_url(&self.base_url);
        let response = self.send(self.client.get(&url)).await?;

        self.decode(response).await
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send a request, folding connection failures into [`CliError::Unreachable`].
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Response> {
        request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                CliError::Unreachable {
                    url: self.base_url.clone(),
                    reason: e.to_string(),
                }
            } else {
                CliError::Http(e)
            }
        })
    }

    /// Unwrap a `{success, data}` envelope, or surface the error envelope.
    async fn decode<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        if !response.status().is_success() {
            return Err(CliError::Api(error_message(response).await));
        }

        let envelope: Envelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}

/// Best-effort extraction of the server's error message.
async fn error_message(response: Response) -> String {
    let status = response.status();

    match response.json::<ErrorEnvelope>().await {
        Ok(envelope) => envelope.error.message,
        Err(_) => format!("HTTP {}", status),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_api_client_creation() {
        let client = ApiClient::new("http://localhost:8080".to_string()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let client = ApiClient::new("http://localhost:9999".to_string()).unwrap();
        let result = client.health_check().await.unwrap();
        assert!(!result);
    }
}
