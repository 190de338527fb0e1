//! API route handlers.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use x402_core::constants::{
    HEADER_CACHE_AGE, HEADER_CACHE_SOURCE, HEADER_CACHE_STALE_REASON, HEADER_CACHE_STATUS,
};
use x402_core::types::{CacheOutcome, CacheSource, CategorySlug};
use x402_ecosystem::CategoryGroup;

use crate::dto::*;
use crate::error::ApiError;
use crate::state::AppState;

type Result<T> = std::result::Result<T, ApiError>;

/// GET /health
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        durable_cache: state.proxy.tiers().sources().contains(&CacheSource::Durable),
    })
}

/// GET /api/facilitators
pub async fn get_facilitators(State(state): State<Arc<AppState>>) -> Result<Response> {
    let outcome = state.proxy.get_facilitator_data().await?;

    debug!(
        status = %outcome.status,
        source = ?outcome.source,
        rows = outcome.data().row_count(),
        "Serving facilitator data"
    );

    Ok((cache_headers(&outcome), Json(outcome.data().as_value())).into_response())
}

fn cache_headers(outcome: &CacheOutcome) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        HeaderName::from_static(HEADER_CACHE_STATUS),
        HeaderValue::from_static(outcome.status.as_str()),
    );
    if let Some(source) = outcome.source {
        headers.insert(
            HeaderName::from_static(HEADER_CACHE_SOURCE),
            HeaderValue::from_static(source.as_str()),
        );
    }
    if let Some(age) = outcome.age_secs {
        headers.insert(HeaderName::from_static(HEADER_CACHE_AGE), HeaderValue::from(age));
    }
    if let Some(reason) = outcome.stale_reason {
        headers.insert(
            HeaderName::from_static(HEADER_CACHE_STALE_REASON),
            HeaderValue::from_static(reason.as_str()),
        );
    }
    headers
}

/// GET /api/ecosystem
pub async fn list_ecosystem(State(state): State<Arc<AppState>>) -> Json<EcosystemResponse> {
    Json(state.ecosystem.by_category().await.into())
}

/// GET /api/ecosystem/:category
pub async fn get_ecosystem_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
) -> Result<Json<CategoryGroup>> {
    let slug: CategorySlug = category.parse()?;

    Ok(Json(CategoryGroup {
        category: slug.meta().clone(),
        entries: state.ecosystem.entries_by_category(slug).await,
    }))
}
