//! HTTP surface
//!
//! The job-queue operations (create via upload, list, inspect, trigger,
//! export) plus the interactive single-CEP lookup and the provider health
//! dashboard. Everything speaks the `{success, data}` envelope; errors go
//! through [`crate::error::AppError`].

pub mod jobs;
pub mod lookup;
pub mod response;

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use crate::batch::JobRunner;
use crate::config::CorsConfig;
use crate::resolver::FallbackResolver;
use crate::store::JobStore;

/// Application state shared across handlers
#[derive(Clone)]
pub struct ApiState {
    pub store: JobStore,
    pub resolver: Arc<FallbackResolver>,
    pub runner: Arc<JobRunner>,
    pub upload_dir: PathBuf,
}

/// Build the application router with all routes and middleware.
pub fn router(state: ApiState, cors: &CorsConfig) -> Router {
    let v1 = Router::new()
        .route("/jobs", post(jobs::create_job).get(jobs::list_jobs))
        .route("/jobs/active", get(jobs::active_job))
        .route("/jobs/next/run", post(jobs::run_next))
        .route("/jobs/:id", get(jobs::get_job))
        .route("/jobs/:id/export", get(jobs::export_job))
        .route("/cep/:code", get(lookup::lookup_cep))
        .route("/providers/status", get(lookup::provider_status));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", v1)
        .with_state(state)
        .layer(crate::middleware::tracing_layer())
        .layer(crate::middleware::cors_layer(cors))
}

/// Health check handler: liveness plus database connectivity.
async fn health_check(State(state): State<ApiState>) -> Result<Response, StatusCode> {
    match sqlx::query("SELECT 1").fetch_one(state.store.pool()).await {
        Ok(_) => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )
            .into_response()),
        Err(e) => {
            tracing::error!("Database health check failed: {:?}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        },
    }
}
