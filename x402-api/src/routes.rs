//! API route configuration.

use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers;
use crate::state::AppState;

/// Creates the API router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))

        // Facilitator analytics
        .route("/api/facilitators", get(handlers::get_facilitators))

        // Ecosystem directory
        .route("/api/ecosystem", get(handlers::list_ecosystem))
        .route("/api/ecosystem/:category", get(handlers::get_ecosystem_category))

        .with_state(state)
}
