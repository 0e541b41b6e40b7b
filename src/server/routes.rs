// src/server/routes.rs
//! Axum router configuration for the repository server
//!
//! Only GET (and the implied HEAD) is routed; other methods get 405.

use crate::server::ServerState;
use crate::server::handlers::{files, status};
use axum::{Router, routing::get};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the main application router
pub fn create_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/", get(status::root))
        .route("/health", get(status::health))
        .route("/info", get(status::info))
        .route("/pool/*path", get(files::pool_file))
        // Packages, Packages.gz and Release are synthesized inside this handler
        .route("/dists/*path", get(files::dists_file))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
