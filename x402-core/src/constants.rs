//! Constants for the x402 facilitator analytics proxy.
//!
//! Cache sizing, upstream location and the HTTP header names clients rely on.

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE
// ═══════════════════════════════════════════════════════════════════════════════

/// Key under which the facilitator payload is stored in every cache tier.
pub const CACHE_KEY: &str = "facilitators-data";

/// Freshness window for a cached payload, in seconds (1 hour).
///
/// Also used as the expiration of durable-tier writes.
pub const CACHE_TTL_SECONDS: u64 = 60 * 60;

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM (Allium explorer query)
// ═══════════════════════════════════════════════════════════════════════════════

/// Allium explorer query that returns daily facilitator activity.
pub const ALLIUM_ENDPOINT: &str =
    "https://api.allium.so/api/v1/explorer/queries/tZrCe3GI79Yym6eG0glp/run";

/// Header carrying the Allium API key.
pub const ALLIUM_API_KEY_HEADER: &str = "X-API-KEY";

/// Name of the top-level field holding the row array in an upstream payload.
pub const PAYLOAD_ROWS_FIELD: &str = "data";

// ═══════════════════════════════════════════════════════════════════════════════
// TIMEOUTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default timeout for the upstream analytics call.
pub const DEFAULT_UPSTREAM_TIMEOUT_SECONDS: u64 = 8;

/// Default timeout for each durable-tier call.
pub const DEFAULT_DURABLE_TIMEOUT_SECONDS: u64 = 2;

// ═══════════════════════════════════════════════════════════════════════════════
// RESPONSE HEADERS
// ═══════════════════════════════════════════════════════════════════════════════

/// `HIT` | `MISS` | `STALE`
pub const HEADER_CACHE_STATUS: &str = "cache-status";

/// `durable` | `local-fallback`, present on HIT and STALE.
pub const HEADER_CACHE_SOURCE: &str = "cache-source";

/// Whole seconds since the payload was stored, present on HIT.
pub const HEADER_CACHE_AGE: &str = "cache-age";

/// `missing-credential` | `fetch-error`, present on STALE.
pub const HEADER_CACHE_STALE_REASON: &str = "cache-stale-reason";

// ═══════════════════════════════════════════════════════════════════════════════
// SERVER DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default root of the ecosystem directory (one sub-directory per category).
pub const DEFAULT_ECOSYSTEM_DIR: &str = "data/ecosystem";

/// Default API server port.
pub const DEFAULT_API_PORT: u16 = 3001;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_is_one_hour() {
        assert_eq!(CACHE_TTL_SECONDS, 3600);
    }

    #[test]
    fn test_timeouts_are_bounded() {
        assert!(DEFAULT_UPSTREAM_TIMEOUT_SECONDS < 10);
        assert!(DEFAULT_DURABLE_TIMEOUT_SECONDS < DEFAULT_UPSTREAM_TIMEOUT_SECONDS);
    }

    #[test]
    fn test_header_names_are_lowercase() {
        for name in [
            HEADER_CACHE_STATUS,
            HEADER_CACHE_SOURCE,
            HEADER_CACHE_AGE,
            HEADER_CACHE_STALE_REASON,
        ] {
            assert_eq!(name, name.to_ascii_lowercase());
        }
    }
}
