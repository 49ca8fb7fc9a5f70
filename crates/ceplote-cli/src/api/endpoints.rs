//! API endpoint URL builders
//!
//! Helper functions to construct server endpoint URLs.

/// Build job collection URL (POST to create, GET to list)
pub fn jobs_url(base_url: &str) -> String {
    format!("{}/api/v1/jobs", base_url)
}

/// Build active job URL
pub fn active_job_url(base_url: &str) -> String {
    format!("{}/api/v1/jobs/active", base_url)
}

/// Build job detail URL
pub fn job_url(base_url: &str, id: i64) -> String {
    format!("{}/api/v1/jobs/{}", base_url, id)
}

/// Build run-next trigger URL
pub fn run_next_url(base_url: &str) -> String {
    format!("{}/api/v1/jobs/next/run", base_url)
}

/// Build job export URL
pub fn export_url(base_url: &str, id: i64) -> String {
    format!("{}/api/v1/jobs/{}/export", base_url, id)
}

/// Build single-CEP lookup URL
pub fn lookup_url(base_url: &str, cep: &str) -> String {
    format!("{}/api/v1/cep/{}", base_url, cep)
}

/// Build provider status URL
pub fn provider_status_url(base_url: &str) -> String {
    format!("{}/api/v1/providers/status", base_url)
}

/// Build health check URL
pub fn health_url(base_url: &str) -> String {
    format!("{}/health", base_url)
}
