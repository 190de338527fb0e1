//! DTOs for API responses.

use serde::Serialize;
use x402_ecosystem::CategoryGroup;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status
    pub status: String,
    /// Version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Whether the durable cache tier is configured
    pub durable_cache: bool,
}

/// Full ecosystem directory.
#[derive(Debug, Serialize)]
pub struct EcosystemResponse {
    /// Categories in display order, each with its entries
    pub categories: Vec<CategoryGroup>,
    /// Number of entries across all categories
    pub total_entries: usize,
}

impl From<Vec<CategoryGroup>> for EcosystemResponse {
    fn from(categories: Vec<CategoryGroup>) -> Self {
        let total_entries = categories.iter().map(|g| g.entries.len()).sum();
        Self {
            categories,
            total_entries,
        }
    }
}
