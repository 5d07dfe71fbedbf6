//! Claims Triage Core - API Server Binary
//!
//! This binary starts the HTTP API server and the background triage
//! operations (claim analyzer and staging housekeeper).
//!
//! # Usage
//!
//! ```bash
//! # Run with default configuration
//! cargo run --bin claims-api
//!
//! # Run with environment variables
//! API_HOST=0.0.0.0 API_PORT=8080 API_DATABASE_URL=postgres://... cargo run --bin claims-api
//! ```
//!
//! # Environment Variables
//!
//! * `API_HOST` - Server host (default: 0.0.0.0)
//! * `API_PORT` - Server port (default: 8080)
//! * `API_DATABASE_URL` - PostgreSQL connection string
//! * `API_LOG_LEVEL` - Log level: trace, debug, info, warn, error (default: info)
//! * `API_STAGING_DIR` - Directory for the document staging area
//! * `API_STAGING_SWEEP_SECS` - Housekeeping sweep interval (default: 60)
//! * `API_POLL_INTERVAL_SECS` - Analyzer poll interval (default: 10)
//! * `API_REASONING_BASE_URL` - OpenAI-compatible reasoning endpoint
//! * `API_REASONING_API_KEY` - Bearer token for the reasoning endpoint
//! * `API_REASONING_MODEL` - Model identifier (default: gpt-4o-mini)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use core_kernel::TaskSupervisor;
use domain_claims::{ClaimsPort, DocumentsPort, ResultsPort};
use engine_triage::{ClaimAnalyzer, ReasoningClient, ReasoningConfig};
use infra_db::{create_pool, run_migrations, ClaimsRepository, DatabaseConfig, DocumentsRepository, ResultsRepository};
use infra_staging::StagingStore;
use interface_api::{config::ApiConfig, create_router, start_background_operations, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present (useful for local development)
    dotenvy::dotenv().ok();

    let config = load_config()?;
    init_tracing(&config.log_level);

    tracing::info!(
        host = %config.host,
        port = %config.port,
        "Starting Claims Triage API Server"
    );

    let pool = create_pool(DatabaseConfig::new(&config.database_url)).await?;
    run_migrations(&pool).await?;

    let claims: Arc<dyn ClaimsPort> = Arc::new(ClaimsRepository::new(pool.clone()));
    let documents: Arc<dyn DocumentsPort> = Arc::new(DocumentsRepository::new(pool.clone()));
    let results: Arc<dyn ResultsPort> = Arc::new(ResultsRepository::new(pool.clone()));
    let staging = Arc::new(StagingStore::new(&config.staging_dir));

    let reasoning = Arc::new(ReasoningClient::new(ReasoningConfig {
        base_url: config.reasoning_base_url.clone(),
        api_key: config.reasoning_api_key.clone(),
        model: config.reasoning_model.clone(),
        ..ReasoningConfig::default()
    })?);

    let supervisor = Arc::new(TaskSupervisor::new());
    let analyzer = Arc::new(ClaimAnalyzer::new(
        Arc::clone(&claims),
        Arc::clone(&documents),
        Arc::clone(&results),
        reasoning,
        Arc::clone(&staging),
        Arc::clone(&supervisor),
    ));

    start_background_operations(
        &supervisor,
        analyzer,
        Arc::clone(&staging),
        Duration::from_secs(config.poll_interval_secs),
        Duration::from_secs(config.staging_sweep_secs),
    )?;

    // surface repeated background failures to the process log
    if let Some(mut failures) = supervisor.failures() {
        tokio::spawn(async move {
            while let Some(failure) = failures.recv().await {
                tracing::error!(task = %failure.name, error = %failure.error, "background task failure reported");
            }
        });
    }

    let state = AppState {
        pool,
        config: config.clone(),
        claims,
        documents,
        results,
        staging,
    };
    let app = create_router(state);

    let addr: SocketAddr = config.server_addr().parse()?;
    tracing::info!(%addr, "Server listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    interface_api::shutdown(&supervisor).await;
    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Loads API configuration from environment variables.
///
/// Unset variables fall back to defaults; a malformed variable is a fatal
/// startup error.
fn load_config() -> Result<ApiConfig, Box<dyn std::error::Error>> {
    let mut config = ApiConfig::from_env()?;
    // plain DATABASE_URL wins over the default when API_DATABASE_URL is unset
    if std::env::var("API_DATABASE_URL").is_err() {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.database_url = url;
        }
    }
    Ok(config)
}

/// Initializes the tracing subscriber for structured logging.
fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// This enables graceful shutdown of the server, allowing in-flight
/// requests to complete before background operations are cancelled.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
