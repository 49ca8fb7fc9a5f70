//! Terminal rendering helpers shared by the commands

use chrono::{DateTime, Local, Utc};
use colored::{ColoredString, Colorize};

use ceplote_common::types::{JobStatus, ProviderState};

/// Colorize a job status label
pub fn status_label(status: JobStatus) -> ColoredString {
    match status {
        JobStatus::Pending => status.as_str().yellow(),
        JobStatus::Running => status.as_str().cyan().bold(),
        JobStatus::Done => status.as_str().green(),
        JobStatus::Failed => status.as_str().red().bold(),
    }
}

/// Colorize a provider health label
pub fn provider_state_label(state: ProviderState) -> ColoredString {
    match state {
        ProviderState::Online => state.to_string().green(),
        ProviderState::Degraded => state.to_string().yellow(),
        ProviderState::Offline => state.to_string().red().bold(),
    }
}

/// Render a timestamp in the operator's local time
pub fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Render an optional timestamp, "-" when absent
pub fn local_time_opt(at: Option<DateTime<Utc>>) -> String {
    at.map(local_time).unwrap_or_else(|| "-".to_string())
}

/// "processed/total" counter column
pub fn record_counter(processed: i64, total: i64) -> String {
    format!("{}/{}", processed, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counter() {
        assert_eq!(record_counter(3, 10), "3/10");
    }

    #[test]
    fn test_local_time_opt_absent() {
        assert_eq!(local_time_opt(None), "-");
    }
}
