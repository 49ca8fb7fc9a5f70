//! Batch orchestrator
//!
//! Drives one job end-to-end: load input, normalize postal codes,
//! deduplicate, resolve through the fallback chain under the concurrency
//! bound, merge results back onto every original row, persist the batch,
//! report progress, repeat until the input is exhausted.
//!
//! Per-code failures are already absorbed by the resolver; only
//! infrastructure failures (file I/O, store writes) reach this layer, and
//! those mark the job `FAILED` while leaving persisted batches exportable.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{error, info, warn};

use ceplote_common::{Cep, JobStatus};

use crate::batch::progress;
use crate::config::BatchConfig;
use crate::resolver::{FallbackResolver, Resolution};
use crate::sheet::{self, InputRow};
use crate::store::{Job, JobStore, ResultRecord, StoreError};

/// Result type alias for runner operations
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Infrastructure-level failures that abort a job run.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Sheet error: {0}")]
    Sheet(#[from] sheet::SheetError),

    #[error("Failed to read input file: {0}")]
    Io(#[from] std::io::Error),
}

/// Background worker that claims queued jobs and runs them to completion.
///
/// One instance per process. The single-RUNNING invariant lives in the
/// store's guarded claim, not here, so an extra trigger from the HTTP
/// surface can never start a second concurrent job.
pub struct JobRunner {
    store: JobStore,
    resolver: Arc<FallbackResolver>,
    batch: BatchConfig,
    poll_interval: Duration,
}

impl JobRunner {
    pub fn new(
        store: JobStore,
        resolver: Arc<FallbackResolver>,
        batch: BatchConfig,
        poll_secs: u64,
    ) -> Self {
        Self {
            store,
            resolver,
            batch,
            poll_interval: Duration::from_secs(poll_secs.max(1)),
        }
    }

    /// Start the background loop: recover any interrupted job, then poll the
    /// queue, running claimed jobs to completion one at a time.
    pub fn spawn(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            info!("Job runner started");

            match self.recover_interrupted().await {
                Ok(Some(job)) => self.run_job(job).await,
                Ok(None) => {},
                Err(e) => error!(error = %e, "Startup recovery failed"),
            }

            loop {
                match self.store.claim_next_pending().await {
                    Ok(Some(job)) => self.run_job(job).await,
                    Ok(None) => sleep(self.poll_interval).await,
                    Err(e) => {
                        error!(error = %e, "Failed to poll the job queue");
                        sleep(self.poll_interval).await;
                    },
                }
            }
        })
    }

    /// Resume policy for a job left `RUNNING` by an abnormal process exit.
    ///
    /// Results append 1:1 with consumed input rows in input order and commit
    /// per batch, so the persisted result count is the authoritative
    /// checkpoint. The progress counter is healed to match and the run
    /// continues past exactly that prefix; at most one in-flight batch was
    /// lost.
    pub async fn recover_interrupted(&self) -> Result<Option<Job>> {
        let Some(job) = self.store.active_job().await? else {
            return Ok(None);
        };

        let checkpoint = self.store.count_results(job.id).await?;
        warn!(
            job_id = job.id,
            checkpoint,
            total = job.total_records,
            "Found a RUNNING job from a previous process, resuming from checkpoint"
        );

        self.store
            .update_status(job.id, JobStatus::Running, Some(checkpoint))
            .await?;

        // Re-read so the healed counter rides along.
        let job = self
            .store
            .get_job(job.id)
            .await?
            .ok_or(StoreError::JobNotFound(job.id))?;

        Ok(Some(job))
    }

    /// Run one claimed job to a terminal state.
    pub async fn run_job(&self, job: Job) {
        let job_id = job.id;
        info!(
            job_id,
            filename = %job.original_filename,
            total = job.total_records,
            "Job started"
        );

        match self.execute(&job).await {
            Ok(processed) => {
                if let Err(e) = self
                    .store
                    .update_status(job_id, JobStatus::Done, Some(processed))
                    .await
                {
                    error!(job_id, error = %e, "Failed to mark job DONE");
                    return;
                }
                info!(job_id, processed, "Job completed");
            },
            Err(e) => {
                error!(job_id, error = %e, "Job failed; persisted batches remain exportable");
                if let Err(e) = self.store.update_status(job_id, JobStatus::Failed, None).await {
                    error!(job_id, error = %e, "Failed to mark job FAILED");
                }
            },
        }
    }

    /// The per-job state machine. Returns the final processed count.
    async fn execute(&self, job: &Job) -> Result<i64> {
        let bytes = tokio::fs::read(&job.source_path).await?;
        let rows = sheet::read_rows(&bytes, &job.cep_column, &job.identifier_column)?;

        if rows.len() as i64 != job.total_records {
            warn!(
                job_id = job.id,
                expected = job.total_records,
                actual = rows.len(),
                "Input row count differs from the recorded total; processing the file as found"
            );
        }

        // Persisted results are the consumed prefix; skip it on resume.
        let skip = self.store.count_results(job.id).await? as usize;
        let mut processed = skip.min(rows.len()) as i64;

        // Per-job dedup cache: each code is resolved once per run, every row
        // sharing it reuses the resolution.
        let mut cache: HashMap<String, Resolution> = HashMap::new();

        let mut first_batch = true;
        for batch_rows in rows[skip.min(rows.len())..].chunks(self.batch.batch_size) {
            if !first_batch && self.batch.pause_ms > 0 {
                sleep(Duration::from_millis(self.batch.pause_ms)).await;
            }
            first_batch = false;

            self.resolve_batch(batch_rows, &mut cache).await;

            let records = merge_batch(batch_rows, &cache);
            self.store.append_results(job.id, &records).await?;

            processed += records.len() as i64;
            self.store
                .update_status(job.id, JobStatus::Running, Some(processed))
                .await?;

            let snapshot = progress::snapshot(processed, job.total_records, job.started_at);
            info!(
                job_id = job.id,
                processed,
                total = job.total_records,
                rate = format!("{:.1}", snapshot.records_per_sec),
                eta_secs = snapshot.eta_secs,
                "Batch persisted"
            );
        }

        Ok(processed)
    }

    /// Resolve every not-yet-cached code of a batch, bounded by the
    /// concurrency limit. Completion order is irrelevant: results land in
    /// the cache keyed by code and are re-projected onto rows afterwards.
    async fn resolve_batch(&self, batch_rows: &[InputRow], cache: &mut HashMap<String, Resolution>) {
        let mut pending: Vec<Cep> = Vec::new();
        for row in batch_rows {
            if let Ok(cep) = Cep::normalize(&row.cep_raw) {
                if !cache.contains_key(cep.as_str()) && !pending.iter().any(|c| c == &cep) {
                    pending.push(cep);
                }
            }
        }

        let resolutions: Vec<(Cep, Resolution)> = stream::iter(pending)
            .map(|cep| {
                let resolver = Arc::clone(&self.resolver);
                async move {
                    let resolution = resolver.resolve(&cep).await;
                    (cep, resolution)
                }
            })
            .buffer_unordered(self.batch.concurrency)
            .collect()
            .await;

        for (cep, resolution) in resolutions {
            cache.insert(cep.as_str().to_string(), resolution);
        }
    }
}

/// Project cached resolutions onto every row of a batch, in input order.
///
/// Every row gets exactly one record with a final status; invalid codes
/// never reached the cache and get the format status with empty fields.
fn merge_batch(batch_rows: &[InputRow], cache: &HashMap<String, Resolution>) -> Vec<ResultRecord> {
    batch_rows
        .iter()
        .map(|row| {
            let resolution = match Cep::normalize(&row.cep_raw) {
                Ok(cep) => cache
                    .get(cep.as_str())
                    .cloned()
                    .unwrap_or_else(Resolution::invalid_format),
                Err(_) => Resolution::invalid_format(),
            };

            let status = resolution.status_label();
            ResultRecord {
                identifier: row.identifier.clone(),
                cep: row.cep_raw.clone(),
                street: resolution.address.street,
                neighborhood: resolution.address.neighborhood,
                city: resolution.address.city,
                state: resolution.address.state,
                status,
            }
        })
        .collect()
}
