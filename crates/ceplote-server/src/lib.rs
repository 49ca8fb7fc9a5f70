//! Ceplote Server Library
//!
//! HTTP service for bulk CEP enrichment.
//!
//! # Overview
//!
//! The server exposes a job queue over uploaded spreadsheets and drives each
//! job through a multi-provider CEP resolver:
//!
//! - **API Endpoints**: job queue surface (upload, list, run, export) plus
//!   interactive lookup and provider health
//! - **Job Store**: durable SQLite record of jobs, progress, and results
//! - **Providers**: BrasilAPI, ViaCEP and AwesomeAPI clients behind one trait
//! - **Fallback Resolver**: priority-order fallback with bounded retries
//! - **Batch Engine**: bounded-concurrency orchestration with per-batch
//!   persistence, so interrupted jobs resume from their last checkpoint
//!
//! ## Framework Stack
//!
//! - **Axum**: HTTP surface
//! - **SQLx**: SQLite persistence with embedded migrations
//! - **reqwest**: outbound provider calls
//!
//! # Example
//!
//! ```no_run
//! use ceplote_server::{config::Config, db};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::init_pool(&config.database).await?;
//!     db::run_migrations(&pool).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod batch;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod providers;
pub mod resolver;
pub mod sheet;
pub mod store;

// Re-export commonly used types
pub use error::{ApiResult, AppError};
