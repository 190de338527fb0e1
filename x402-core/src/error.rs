//! Error types for x402.
//!
//! This module provides the error hierarchy using `thiserror`. Variants are
//! grouped by the layer that raises them so callers can decide whether a
//! failure is a configuration problem, a transient upstream problem, or a
//! degraded cache dependency.

use thiserror::Error;

/// Result type alias using `X402Error`.
pub type Result<T> = std::result::Result<T, X402Error>;

/// Main error type for all x402 operations.
#[derive(Debug, Error)]
pub enum X402Error {
    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The upstream API key is not configured.
    #[error("ALLIUM_API_KEY environment variable is not set")]
    MissingApiKey,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // UPSTREAM ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Upstream answered with a non-success status.
    #[error("Allium API error: {status} {reason}")]
    UpstreamStatus {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase
        reason: String,
    },

    /// Upstream body is not a valid analytics payload.
    #[error("Invalid response structure from Allium API: {0}")]
    InvalidPayload(String),

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Connection timeout.
    #[error("Connection timeout: {0}")]
    ConnectionTimeout(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // CACHE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Durable cache tier could not be read or written.
    #[error("Durable cache error: {0}")]
    DurableCache(String),

    /// Upstream failed and no tier holds any payload.
    #[error("No cached facilitator data available")]
    NoCachedData,

    // ═══════════════════════════════════════════════════════════════════════════
    // ECOSYSTEM ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Unknown ecosystem category slug.
    #[error("Unknown ecosystem category: {0}")]
    UnknownCategory(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION / IO ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl X402Error {
    /// Returns true if this error is recoverable (a later retry may succeed).
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            X402Error::HttpError(_)
                | X402Error::ConnectionTimeout(_)
                | X402Error::UpstreamStatus { .. }
                | X402Error::InvalidPayload(_)
                | X402Error::DurableCache(_)
                | X402Error::NoCachedData
        )
    }

    /// Returns true if this error needs a redeploy with different settings.
    pub fn is_config_error(&self) -> bool {
        matches!(self, X402Error::MissingApiKey | X402Error::ConfigError(_))
    }
}
