//! Error types for the Ceplote CLI
//!
//! All errors are user-facing: each message says what went wrong and what to
//! try next.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Comprehensive error type for CLI operations
#[derive(Error, Debug)]
pub enum CliError {
    /// The server answered with an error envelope
    #[error("Server error: {0}")]
    Api(String),

    /// The server could not be reached at all
    #[error("Cannot reach the server at '{url}': {reason}. Is the server running? Set --server-url or CEPLOTE_SERVER_URL if it listens elsewhere.")]
    Unreachable { url: String, reason: String },

    /// A job holds the RUNNING slot
    #[error("{0}. Wait for it to finish or watch it with 'ceplote job <id>'.")]
    JobAlreadyRunning(String),

    /// The queue has nothing to run
    #[error("No pending jobs in the queue. Upload a sheet first with 'ceplote upload <file>'.")]
    QueueEmpty,

    /// A watched job reached the FAILED state
    #[error("Job {id} failed after {processed} record(s). Persisted batches remain exportable with 'ceplote export {id}'.")]
    JobFailed { id: i64, processed: i64 },

    /// Required file is missing
    #[error("File not found: '{0}'. Verify the path exists and you have read permissions.")]
    FileNotFound(String),

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("Network request failed: {0}. Check your connection and server URL.")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse the server response: {0}. The server and CLI versions may not match.")]
    JsonParse(#[from] serde_json::Error),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create an API error
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }
}
