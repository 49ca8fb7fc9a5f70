//! Advisory throughput and ETA reporting
//!
//! Derived entirely from a job's counters and start time, so the same
//! numbers come out identical whether the runner logs them after a batch or
//! the API computes them for a status request.

use chrono::{DateTime, Utc};

use ceplote_common::types::Progress;

/// Compute a progress snapshot from a job's counters.
pub fn snapshot(
    processed: i64,
    total: i64,
    started_at: Option<DateTime<Utc>>,
) -> Progress {
    let fraction = if total > 0 {
        (processed as f64 / total as f64).clamp(0.0, 1.0)
    } else {
        0.0
    };

    let elapsed_secs = started_at
        .map(|t| (Utc::now() - t).num_milliseconds() as f64 / 1000.0)
        .unwrap_or(0.0);

    let records_per_sec = if elapsed_secs > 0.0 && processed > 0 {
        processed as f64 / elapsed_secs
    } else {
        0.0
    };

    let remaining = (total - processed).max(0);
    let eta_secs = if records_per_sec > 0.0 && remaining > 0 {
        Some((remaining as f64 / records_per_sec).ceil() as u64)
    } else {
        None
    };

    Progress {
        processed,
        total,
        fraction,
        records_per_sec,
        eta_secs,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_fraction_and_rate() {
        let started = Utc::now() - Duration::seconds(10);
        let progress = snapshot(50, 100, Some(started));

        assert!((progress.fraction - 0.5).abs() < 1e-9);
        // ~5 records/sec, allow slack for the wall clock
        assert!(progress.records_per_sec > 4.0 && progress.records_per_sec < 6.0);
        let eta = progress.eta_secs.unwrap();
        assert!((8..=13).contains(&eta), "eta was {eta}");
    }

    #[test]
    fn test_no_estimate_before_any_progress() {
        let started = Utc::now() - Duration::seconds(10);
        let progress = snapshot(0, 100, Some(started));

        assert_eq!(progress.records_per_sec, 0.0);
        assert_eq!(progress.eta_secs, None);
        assert_eq!(progress.fraction, 0.0);
    }

    #[test]
    fn test_completed_job_has_no_eta() {
        let started = Utc::now() - Duration::seconds(10);
        let progress = snapshot(100, 100, Some(started));

        assert_eq!(progress.fraction, 1.0);
        assert_eq!(progress.eta_secs, None);
    }

    #[test]
    fn test_zero_total_is_safe() {
        let progress = snapshot(0, 0, None);
        assert_eq!(progress.fraction, 0.0);
        assert_eq!(progress.eta_secs, None);
    }
}
