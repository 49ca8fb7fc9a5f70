//! Wire envelopes for server responses
//!
//! The payload types themselves live in `ceplote-common`; this module only
//! adds the `{success, data}` / `{success, error}` wrappers the server
//! speaks.

use serde::Deserialize;

/// Success envelope: `{"success": true, "data": ...}`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: T,
}

/// Error envelope: `{"success": false, "error": {"code", "message"}}`
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use ceplote_common::types::JobSummary;

    #[test]
    fn test_success_envelope_deserializes() {
        let json = serde_json::json!({
            "success": true,
            "data": {
                "id": 1,
                "original_filename": "a.csv",
                "cep_column": "CEP",
                "identifier_column": "Proposta",
                "status": "PENDING",
                "total_records": 2,
                "processed_records": 0,
                "created_at": "2025-01-18T12:00:00Z",
                "started_at": null,
                "finished_at": null
            }
        });

        let envelope: Envelope<JobSummary> = serde_json::from_value(json).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.data.id, 1);
    }

    #[test]
    fn test_error_envelope_deserializes() {
        let json = serde_json::json!({
            "success": false,
            "error": { "code": "CONFLICT", "message": "Job 3 is already running" }
        });

        let envelope: ErrorEnvelope = serde_json::from_value(json).unwrap();
        assert_eq!(envelope.error.code, "CONFLICT");
    }
}
