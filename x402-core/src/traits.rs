//! Common traits for x402.
//!
//! These traits define the seams between the proxy and its dependencies,
//! so tiers and upstreams can be swapped for in-memory fakes in tests.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AnalyticsPayload, CacheSource, CachedPayload};

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE TIER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// One tier of the facilitator cache.
///
/// Implementations might use:
/// - A process-local slot (always available, never shared)
/// - A managed key-value store reachable over the network
///
/// Tiers do not decide freshness. `try_get` returns whatever is stored and
/// the caller compares `stored_at` against its TTL.
#[async_trait]
pub trait CacheTier: Send + Sync {
    /// Where payloads served from this tier are attributed to.
    fn source(&self) -> CacheSource;

    /// Short name used in log lines.
    fn name(&self) -> &str;

    /// Reads the payload stored under `key`, if any.
    async fn try_get(&self, key: &str) -> Result<Option<CachedPayload>>;

    /// Stores `payload` under `key`, replacing any previous value.
    ///
    /// `ttl` is the expiration the tier should enforce, if it can.
    async fn try_set(&self, key: &str, payload: &CachedPayload, ttl: Duration) -> Result<()>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// UPSTREAM TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Source of fresh facilitator analytics.
#[async_trait]
pub trait UpstreamSource: Send + Sync {
    /// Returns false when the credential needed to call the upstream is absent.
    fn is_configured(&self) -> bool;

    /// Performs one upstream call and returns the structurally valid payload.
    async fn fetch(&self) -> Result<AnalyticsPayload>;
}
