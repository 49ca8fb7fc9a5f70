//! Job queue routes
//!
//! Upload + column resolution creates a job; the queue is drained by the
//! background runner, with `POST /jobs/next/run` as an immediate trigger.
//! Export serves whatever has been persisted so far, so a FAILED job's
//! partial results stay downloadable.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::info;
use uuid::Uuid;

use ceplote_common::types::{JobDetail, JobStatus, JobSummary};

use crate::batch::progress;
use crate::error::{ApiResult, AppError};
use crate::sheet;
use crate::store::NewJob;

use super::response::ApiResponse;
use super::ApiState;

/// POST /api/v1/jobs: multipart upload, column resolution, job creation.
pub async fn create_job(
    State(state): State<ApiState>,
    mut multipart: Multipart,
) -> ApiResult<Response> {
    let mut content: Option<Vec<u8>> = None;
    let mut original_filename = "upload.csv".to_string();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to read multipart field: {e}")))?
    {
        if field.name() == Some("file") {
            if let Some(name) = field.file_name() {
                original_filename = name.to_string();
            }
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read file bytes: {e}")))?;
            content = Some(data.to_vec());
        }
    }

    let content = content
        .ok_or_else(|| AppError::BadRequest("No 'file' field found in multipart data".to_string()))?;

    // Column resolution up front: a sheet we cannot process never becomes a job.
    let info = sheet::inspect(&content)?;

    // Retain the raw upload for provenance and resume.
    tokio::fs::create_dir_all(&state.upload_dir).await?;
    let source_path = state.upload_dir.join(format!("{}.csv", Uuid::new_v4()));
    tokio::fs::write(&source_path, &content).await?;

    let id = state
        .store
        .create_job(&NewJob {
            original_filename: original_filename.clone(),
            source_path: source_path.to_string_lossy().to_string(),
            cep_column: info.cep_column,
            identifier_column: info.identifier_column,
            total_records: info.total_records,
        })
        .await?;

    info!(
        job_id = id,
        filename = %original_filename,
        total = info.total_records,
        "Job created"
    );

    let job = state
        .store
        .get_job(id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("Job {id} vanished after creation")))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(JobSummary::from(job))),
    )
        .into_response())
}

/// GET /api/v1/jobs: all jobs, newest first.
pub async fn list_jobs(State(state): State<ApiState>) -> ApiResult<ApiResponse<Vec<JobSummary>>> {
    let jobs = state.store.list_jobs().await?;
    Ok(ApiResponse::success(
        jobs.into_iter().map(JobSummary::from).collect(),
    ))
}

/// GET /api/v1/jobs/active: the RUNNING job or null.
pub async fn active_job(
    State(state): State<ApiState>,
) -> ApiResult<ApiResponse<Option<JobSummary>>> {
    let job = state.store.active_job().await?;
    Ok(ApiResponse::success(job.map(JobSummary::from)))
}

/// GET /api/v1/jobs/:id: detail plus a progress snapshot while running.
pub async fn get_job(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> ApiResult<ApiResponse<JobDetail>> {
    let job = state
        .store
        .get_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;

    let progress = (job.status() == JobStatus::Running).then(|| {
        progress::snapshot(job.processed_records, job.total_records, job.started_at)
    });

    Ok(ApiResponse::success(JobDetail {
        job: JobSummary::from(job),
        progress,
    }))
}

/// POST /api/v1/jobs/next/run: claim and start the oldest PENDING job.
///
/// 409 while a job holds the RUNNING slot, 404 on an empty queue, 202 with
/// the claimed job otherwise.
pub async fn run_next(State(state): State<ApiState>) -> ApiResult<Response> {
    if let Some(active) = state.store.active_job().await? {
        return Err(AppError::Conflict(format!(
            "Job {} is already running",
            active.id
        )));
    }

    let Some(job) = state.store.claim_next_pending().await? else {
        return Err(AppError::NotFound("No pending jobs in the queue".to_string()));
    };

    let summary = JobSummary::from(job.clone());
    let runner = state.runner.clone();
    tokio::spawn(async move {
        runner.run_job(job).await;
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(ApiResponse::success(summary)),
    )
        .into_response())
}

/// GET /api/v1/jobs/:id/export: results as a CSV attachment.
pub async fn export_job(
    State(state): State<ApiState>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let job = state
        .store
        .get_job(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;

    let records = state.store.results_for_job(job.id).await?;
    let csv_bytes = sheet::write_results_csv(&records)?;

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"job-{id}-resultados.csv\""),
            ),
        ],
        csv_bytes,
    )
        .into_response())
}
