//! blackout-svc library - interruption resolution service
//!
//! Read-only HTTP service over the municipal address registry: address
//! search, interruption listing, and per-building resolution with neighbor
//! discovery and predicted end times.

use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod services;

use services::{AddressResolver, BlackoutMatcher, ResolutionOrchestrator};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub address: AddressResolver,
    pub matcher: BlackoutMatcher,
    pub orchestrator: Arc<ResolutionOrchestrator>,
}

impl AppState {
    /// Create new application state over the read-only structural store
    pub fn new(db: SqlitePool, orchestrator: Arc<ResolutionOrchestrator>) -> Self {
        Self {
            address: AddressResolver::new(db.clone()),
            matcher: BlackoutMatcher::new(db),
            orchestrator,
        }
    }
}

/// Build application router
///
/// Collection routes answer with and without the trailing slash.
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let routes = Router::new()
        .route("/api/address", get(api::search_addresses))
        .route("/api/address/", get(api::search_addresses))
        .route("/api/address/districts", get(api::list_districts))
        .route("/api/blackout", get(api::list_blackouts))
        .route("/api/blackout/", get(api::list_blackouts))
        .route("/api/blackout/by-building", get(api::blackouts_by_building));

    Router::new()
        .merge(routes)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy allowing GET requests from a single web origin
pub fn cors_layer(origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = HeaderValue::from_str(origin)
        .map_err(|e| anyhow::anyhow!("Invalid CORS origin {:?}: {}", origin, e))?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::exact(origin))
        .allow_methods([Method::GET]))
}
