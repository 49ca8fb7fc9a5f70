//! Ceplote Server - Main entry point

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use ceplote_common::logging::{init_logging, LogConfig};
use tokio::signal;
use tracing::info;

use ceplote_server::{
    api::{self, ApiState},
    batch::JobRunner,
    config::Config,
    db,
    providers::{self, RetryPolicy},
    resolver::FallbackResolver,
    store::JobStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging with configuration from environment
    let log_config = LogConfig {
        log_file_prefix: "ceplote-server".to_string(),
        filter_directives: Some(
            "ceplote_server=debug,tower_http=debug,sqlx=info".to_string(),
        ),
        ..LogConfig::default()
    };
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    init_logging(&log_config)?;

    info!("Starting Ceplote Server");

    // Load configuration
    let config = Config::load()?;
    info!(
        "Configuration loaded - server will bind to {}:{}",
        config.server.host, config.server.port
    );

    // Initialize database pool and schema
    let pool = db::init_pool(&config.database).await?;
    db::run_migrations(&pool).await?;
    info!("Database ready at {}", config.database.url);

    let store = JobStore::new(pool);

    // Provider chain and fallback resolver
    let client = providers::build_http_client(config.providers.timeout_secs)?;
    let resolver = Arc::new(FallbackResolver::new(
        providers::default_providers(&config.providers, client),
        RetryPolicy::from_config(&config.providers),
    ));

    // Batch runner
    let runner = Arc::new(JobRunner::new(
        store.clone(),
        resolver.clone(),
        config.batch.clone(),
        config.runner.poll_secs,
    ));

    let _runner_handle = if config.runner.enabled {
        info!(
            concurrency = config.batch.concurrency,
            batch_size = config.batch.batch_size,
            "Job runner enabled, starting background loop"
        );
        Some(runner.clone().spawn())
    } else {
        info!("Job runner disabled (CEPLOTE_RUNNER_ENABLED=false)");
        None
    };

    // Build the application router
    let state = ApiState {
        store,
        resolver,
        runner,
        upload_dir: config.upload.dir.clone().into(),
    };
    let app = api::router(state, &config.cors);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    // Start server with graceful shutdown; an interrupted run is recovered
    // by the startup policy on next boot.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(config.server.shutdown_timeout_secs))
        .await?;

    info!("Server shut down gracefully");

    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal(timeout_secs: u64) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, starting graceful shutdown");
        },
        _ = terminate => {
            info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give ongoing requests time to complete
    info!("Waiting up to {} seconds for connections to close", timeout_secs);
    tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
}
