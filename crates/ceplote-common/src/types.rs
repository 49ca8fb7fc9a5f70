//! Wire types shared by the Ceplote server and CLI

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a batch job.
///
/// At most one job is `Running` system-wide; the store enforces it.
/// `Done` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Pending,
    Running,
    Done,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Running => "RUNNING",
            JobStatus::Done => "DONE",
            JobStatus::Failed => "FAILED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "PENDING" => JobStatus::Pending,
            "RUNNING" => JobStatus::Running,
            "DONE" => JobStatus::Done,
            "FAILED" => JobStatus::Failed,
            _ => JobStatus::Pending,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Normalized address fields, identical across providers.
///
/// Every provider maps its own response field names into this shape; nothing
/// above the provider clients knows provider-specific naming. Fields missing
/// or empty in a provider response are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub street: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

// ============================================================================
// Job API Types
// ============================================================================

/// One job as reported by the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSummary {
    /// Monotonic id, assigned at creation
    pub id: i64,

    /// Name of the uploaded file as sent by the client
    pub original_filename: String,

    /// Resolved postal-code column in the source sheet
    pub cep_column: String,

    /// Resolved identifier column in the source sheet
    pub identifier_column: String,

    /// Lifecycle state
    pub status: JobStatus,

    /// Number of data rows in the source sheet
    pub total_records: i64,

    /// Rows already resolved and persisted
    pub processed_records: i64,

    /// When the job was created
    pub created_at: DateTime<Utc>,

    /// When the job was claimed by the runner
    pub started_at: Option<DateTime<Utc>>,

    /// When the job entered a terminal state
    pub finished_at: Option<DateTime<Utc>>,
}

/// Advisory throughput numbers for a job, derived from its counters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub processed: i64,
    pub total: i64,
    /// Completion fraction in `0.0..=1.0`
    pub fraction: f64,
    /// Records resolved per second since the job started
    pub records_per_sec: f64,
    /// Estimated seconds until completion, when the rate allows an estimate
    pub eta_secs: Option<u64>,
}

/// Job detail response: the summary plus progress while it is running.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: JobSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
}

// ============================================================================
// Lookup API Types
// ============================================================================

/// One provider's answer for an interactive single-CEP lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderAnswer {
    /// Provider display name, e.g. `"BrasilAPI"`
    pub provider: String,

    /// `"Sucesso"`, `"Não encontrado"` or `"Serviço indisponível"`
    pub status: String,

    /// Present only on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,

    /// Round-trip time for this provider
    pub latency_ms: u64,
}

/// Response body of the single-CEP lookup endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CepLookup {
    /// The normalized 8-digit code that was queried
    pub cep: String,
    pub answers: Vec<ProviderAnswer>,
}

/// Health classification of one provider, from the status dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderState {
    /// Reachable and answering the reference CEP correctly
    Online,
    /// Reachable but not answering the reference CEP correctly
    #[serde(rename = "Com Erros")]
    Degraded,
    /// Unreachable or timing out
    Offline,
}

impl std::fmt::Display for ProviderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderState::Online => write!(f, "Online"),
            ProviderState::Degraded => write!(f, "Com Erros"),
            ProviderState::Offline => write!(f, "Offline"),
        }
    }
}

/// One row of the provider status dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderHealth {
    pub provider: String,
    pub state: ProviderState,
    pub latency_ms: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_job_status_round_trip() {
        for status in [
            JobStatus::Pending,
            JobStatus::Running,
            JobStatus::Done,
            JobStatus::Failed,
        ] {
            assert_eq!(JobStatus::from(status.as_str().to_string()), status);
        }
    }

    #[test]
    fn test_job_status_terminal() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Done.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_job_status_serializes_uppercase() {
        let json = serde_json::to_string(&JobStatus::Running).unwrap();
        assert_eq!(json, "\"RUNNING\"");
    }

    #[test]
    fn test_provider_state_labels() {
        assert_eq!(ProviderState::Online.to_string(), "Online");
        assert_eq!(ProviderState::Degraded.to_string(), "Com Erros");
        assert_eq!(ProviderState::Offline.to_string(), "Offline");
    }
}
