//! Durable job store
//!
//! The store is the single source of truth for job definitions, progress
//! counters, and accumulated per-row results. The orchestrator and the HTTP
//! surface both read through it; nothing caches "is a job running" anywhere
//! else. Two invariants are enforced here:
//!
//! - at most one job is `RUNNING` system-wide (partial unique index plus a
//!   guarded claim UPDATE);
//! - `processed_records` never decreases and never exceeds `total_records`.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;

use ceplote_common::types::{JobStatus, JobSummary};

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Store operation failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Job {0} not found")]
    JobNotFound(i64),
}

/// A persisted job row.
#[derive(Debug, Clone, FromRow)]
pub struct Job {
    pub id: i64,
    pub original_filename: String,
    pub source_path: String,
    pub cep_column: String,
    pub identifier_column: String,
    pub status: String,
    pub total_records: i64,
    pub processed_records: i64,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Job {
    pub fn status(&self) -> JobStatus {
        JobStatus::from(self.status.clone())
    }
}

impl From<Job> for JobSummary {
    fn from(job: Job) -> Self {
        let status = job.status();
        JobSummary {
            id: job.id,
            original_filename: job.original_filename,
            cep_column: job.cep_column,
            identifier_column: job.identifier_column,
            status,
            total_records: job.total_records,
            processed_records: job.processed_records,
            created_at: job.created_at,
            started_at: job.started_at,
            finished_at: job.finished_at,
        }
    }
}

/// Definition of a job to create.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub original_filename: String,
    pub source_path: String,
    pub cep_column: String,
    pub identifier_column: String,
    pub total_records: i64,
}

/// One persisted output row.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct ResultRecord {
    pub identifier: Option<String>,
    /// Postal code text as it appeared in the source sheet
    pub cep: String,
    pub street: Option<String>,
    pub neighborhood: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub status: String,
}

/// Durable record of jobs and their results over SQLite.
#[derive(Clone)]
pub struct JobStore {
    pool: SqlitePool,
}

impl JobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Persist a new job in `PENDING` state with zeroed progress.
    pub async fn create_job(&self, def: &NewJob) -> Result<i64> {
        let id: (i64,) = sqlx::query_as(
            r#"
            INSERT INTO jobs (original_filename, source_path, cep_column, identifier_column,
                              status, total_records, processed_records, created_at)
            VALUES (?1, ?2, ?3, ?4, 'PENDING', ?5, 0, ?6)
            RETURNING id
            "#,
        )
        .bind(&def.original_filename)
        .bind(&def.source_path)
        .bind(&def.cep_column)
        .bind(&def.identifier_column)
        .bind(def.total_records)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(id.0)
    }

    pub async fn get_job(&self, id: i64) -> Result<Option<Job>> {
        let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(job)
    }

    /// All jobs, newest first.
    pub async fn list_jobs(&self) -> Result<Vec<Job>> {
        let jobs = sqlx::query_as::<_, Job>("SELECT * FROM jobs ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(jobs)
    }

    /// Oldest `PENDING` job, or none. Defines the FIFO queue order.
    pub async fn next_pending(&self) -> Result<Option<Job>> {
        let job = sqlx::query_as::<_, Job>(
            "SELECT * FROM jobs WHERE status = 'PENDING' ORDER BY id ASC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }

    /// The job currently `RUNNING`, or none.
    pub async fn active_job(&self) -> Result<Option<Job>> {
        let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE status = 'RUNNING' LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;

        Ok(job)
    }

    /// Atomically transition the queue head from `PENDING` to `RUNNING`.
    ///
    /// Refuses while any job holds the `RUNNING` slot; the partial unique
    /// index backstops the NOT-EXISTS guard. Returns the claimed job, or
    /// `None` when the queue is empty or a job is already running.
    pub async fn claim_next_pending(&self) -> Result<Option<Job>> {
        let job = sqlx::query_as::<_, Job>(
            r#"
            UPDATE jobs
            SET status = 'RUNNING', started_at = ?1
            WHERE id = (SELECT id FROM jobs WHERE status = 'PENDING' ORDER BY id ASC LIMIT 1)
              AND NOT EXISTS (SELECT 1 FROM jobs WHERE status = 'RUNNING')
            RETURNING *
            "#,
        )
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        Ok(job)
    }

    /// Atomic status and/or progress update.
    ///
    /// `processed` of `None` leaves the counter untouched. Entering `DONE` or
    /// `FAILED` stamps `finished_at`. The counter is clamped monotonic in SQL
    /// so a late or replayed update can never move it backwards or past the
    /// total.
    pub async fn update_status(
        &self,
        id: i64,
        status: JobStatus,
        processed: Option<i64>,
    ) -> Result<()> {
        let finished_at = status.is_terminal().then(Utc::now);

        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = ?1,
                processed_records = MIN(total_records, MAX(processed_records, COALESCE(?2, processed_records))),
                finished_at = COALESCE(?3, finished_at)
            WHERE id = ?4
            "#,
        )
        .bind(status.as_str())
        .bind(processed)
        .bind(finished_at)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::JobNotFound(id));
        }

        Ok(())
    }

    /// Durably append one batch of results in a single transaction.
    ///
    /// Called once per processing batch; a crash mid-job loses at most the
    /// one in-flight batch that had not committed yet.
    pub async fn append_results(&self, job_id: i64, records: &[ResultRecord]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                r#"
                INSERT INTO results (job_id, identifier, cep, street, neighborhood, city, state, status)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(job_id)
            .bind(&record.identifier)
            .bind(&record.cep)
            .bind(&record.street)
            .bind(&record.neighborhood)
            .bind(&record.city)
            .bind(&record.state)
            .bind(&record.status)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Number of persisted results for a job.
    ///
    /// Results append 1:1 with consumed input rows in input order, so this is
    /// the authoritative resume checkpoint after an abnormal exit.
    pub async fn count_results(&self, job_id: i64) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM results WHERE job_id = ?1")
            .bind(job_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.0)
    }

    /// All results for a job in insertion order (original input row order).
    pub async fn results_for_job(&self, job_id: i64) -> Result<Vec<ResultRecord>> {
        let records = sqlx::query_as::<_, ResultRecord>(
            r#"
            SELECT identifier, cep, street, neighborhood, city, state, status
            FROM results
            WHERE job_id = ?1
            ORDER BY id ASC
            "#,
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn test_store() -> JobStore {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("../../migrations").run(&pool).await.unwrap();
        JobStore::new(pool)
    }

    fn sample_job(name: &str) -> NewJob {
        NewJob {
            original_filename: format!("{name}.csv"),
            source_path: format!("/tmp/{name}.csv"),
            cep_column: "CEP".to_string(),
            identifier_column: "PROPOSTA".to_string(),
            total_records: 2,
        }
    }

    fn sample_record(cep: &str, status: &str) -> ResultRecord {
        ResultRecord {
            identifier: Some("P1".to_string()),
            cep: cep.to_string(),
            street: None,
            neighborhood: None,
            city: None,
            state: None,
            status: status.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_get_job() {
        let store = test_store().await;

        let id = store.create_job(&sample_job("a")).await.unwrap();
        let job = store.get_job(id).await.unwrap().unwrap();

        assert_eq!(job.status(), JobStatus::Pending);
        assert_eq!(job.total_records, 2);
        assert_eq!(job.processed_records, 0);
        assert!(job.started_at.is_none());
        assert!(job.finished_at.is_none());
    }

    #[tokio::test]
    async fn test_ids_are_monotonic_and_listing_is_newest_first() {
        let store = test_store().await;

        let first = store.create_job(&sample_job("a")).await.unwrap();
        let second = store.create_job(&sample_job("b")).await.unwrap();
        assert!(second > first);

        let jobs = store.list_jobs().await.unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].id, second);
        assert_eq!(jobs[1].id, first);
    }

    #[tokio::test]
    async fn test_queue_is_fifo() {
        let store = test_store().await;

        let first = store.create_job(&sample_job("a")).await.unwrap();
        store.create_job(&sample_job("b")).await.unwrap();

        let head = store.next_pending().await.unwrap().unwrap();
        assert_eq!(head.id, first);
    }

    #[tokio::test]
    async fn test_claim_transitions_and_stamps_started_at() {
        let store = test_store().await;

        let id = store.create_job(&sample_job("a")).await.unwrap();
        let claimed = store.claim_next_pending().await.unwrap().unwrap();

        assert_eq!(claimed.id, id);
        assert_eq!(claimed.status(), JobStatus::Running);
        assert!(claimed.started_at.is_some());

        let active = store.active_job().await.unwrap().unwrap();
        assert_eq!(active.id, id);
    }

    #[tokio::test]
    async fn test_claim_refuses_while_one_is_running() {
        let store = test_store().await;

        store.create_job(&sample_job("a")).await.unwrap();
        store.create_job(&sample_job("b")).await.unwrap();

        let first = store.claim_next_pending().await.unwrap();
        assert!(first.is_some());

        // Second claim must refuse: the RUNNING slot is taken.
        let second = store.claim_next_pending().await.unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_claim_returns_none_on_empty_queue() {
        let store = test_store().await;
        assert!(store.claim_next_pending().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_terminal_status_stamps_finished_at() {
        let store = test_store().await;

        let id = store.create_job(&sample_job("a")).await.unwrap();
        store.claim_next_pending().await.unwrap();
        store
            .update_status(id, JobStatus::Done, Some(2))
            .await
            .unwrap();

        let job = store.get_job(id).await.unwrap().unwrap();
        assert_eq!(job.status(), JobStatus::Done);
        assert_eq!(job.processed_records, 2);
        assert!(job.finished_at.is_some());

        // A freed RUNNING slot allows the next claim.
        store.create_job(&sample_job("b")).await.unwrap();
        assert!(store.claim_next_pending().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_progress_counter_is_monotonic_and_bounded() {
        let store = test_store().await;

        let id = store.create_job(&sample_job("a")).await.unwrap();
        store.claim_next_pending().await.unwrap();

        store
            .update_status(id, JobStatus::Running, Some(1))
            .await
            .unwrap();
        // A stale update cannot move the counter backwards.
        store
            .update_status(id, JobStatus::Running, Some(0))
            .await
            .unwrap();
        let job = store.get_job(id).await.unwrap().unwrap();
        assert_eq!(job.processed_records, 1);

        // Nor past the total.
        store
            .update_status(id, JobStatus::Running, Some(99))
            .await
            .unwrap();
        let job = store.get_job(id).await.unwrap().unwrap();
        assert_eq!(job.processed_records, job.total_records);
    }

    #[tokio::test]
    async fn test_update_unknown_job_fails() {
        let store = test_store().await;
        let err = store
            .update_status(42, JobStatus::Done, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::JobNotFound(42)));
    }

    #[tokio::test]
    async fn test_append_results_is_incremental_and_ordered() {
        let store = test_store().await;
        let id = store.create_job(&sample_job("a")).await.unwrap();

        store
            .append_results(id, &[sample_record("01001000", "BrasilAPI: Sucesso")])
            .await
            .unwrap();
        assert_eq!(store.count_results(id).await.unwrap(), 1);

        store
            .append_results(id, &[sample_record("00000000", "FALHA TOTAL")])
            .await
            .unwrap();
        assert_eq!(store.count_results(id).await.unwrap(), 2);

        let records = store.results_for_job(id).await.unwrap();
        assert_eq!(records[0].cep, "01001000");
        assert_eq!(records[1].cep, "00000000");
    }

    #[tokio::test]
    async fn test_active_job_survives_restart_view() {
        // A stale RUNNING job is observable through active_job; the runner's
        // startup recovery depends on that.
        let store = test_store().await;

        let id = store.create_job(&sample_job("a")).await.unwrap();
        store.claim_next_pending().await.unwrap();
        store
            .append_results(id, &[sample_record("01001000", "BrasilAPI: Sucesso")])
            .await
            .unwrap();

        // No process is executing the job, yet it is still RUNNING.
        let stale = store.active_job().await.unwrap().unwrap();
        assert_eq!(stale.id, id);
        assert_eq!(store.count_results(id).await.unwrap(), 1);
    }
}
