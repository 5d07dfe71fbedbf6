//! HTTP API Layer
//!
//! This crate provides the REST API for the claims triage system using Axum,
//! plus the wiring that registers the background operations (claim analyzer
//! and staging housekeeper) with the process supervisor.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for claims, documents, and health
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, patch, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use core_kernel::{SupervisorError, TaskSupervisor};
use domain_claims::{ClaimsPort, DocumentsPort, ResultsPort};
use engine_triage::ClaimAnalyzer;
use infra_staging::StagingStore;

use crate::config::ApiConfig;
use crate::handlers::{claims, documents, health};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: ApiConfig,
    pub claims: Arc<dyn ClaimsPort>,
    pub documents: Arc<dyn DocumentsPort>,
    pub results: Arc<dyn ResultsPort>,
    pub staging: Arc<StagingStore>,
}

/// Creates the main API router
pub fn create_router(state: AppState) -> Router {
    // Public routes (no versioned prefix)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    let claims_routes = Router::new()
        .route("/", post(claims::submit_claim))
        .route("/", get(claims::list_claims))
        .route("/:id", get(claims::get_claim))
        .route("/:id", patch(claims::update_claim));

    let documents_routes = Router::new().route("/:claim_id", post(documents::upload_documents));

    let api_routes = Router::new()
        .nest("/claims", claims_routes)
        .nest("/documents", documents_routes);

    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Registers the analyzer loop and the staging housekeeper with the
/// supervisor
///
/// # Errors
///
/// Fails with [`SupervisorError::ShutdownInProgress`] when the supervisor has
/// already been shut down.
pub fn start_background_operations(
    supervisor: &TaskSupervisor,
    analyzer: Arc<ClaimAnalyzer>,
    staging: Arc<StagingStore>,
    poll_interval: Duration,
    sweep_interval: Duration,
) -> Result<(), SupervisorError> {
    supervisor.spawn("claim-analyzer", analyzer.run(poll_interval))?;
    supervisor.spawn(
        "staging-housekeeper",
        infra_staging::run_housekeeper(staging, sweep_interval),
    )?;
    Ok(())
}

/// Cancels all background operations and waits for them to settle
pub async fn shutdown(supervisor: &TaskSupervisor) {
    supervisor.cancel_all().await;
}
