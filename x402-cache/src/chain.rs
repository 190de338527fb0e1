//! Ordered list of cache tiers.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use x402_core::traits::CacheTier;
use x402_core::types::{CacheSource, CachedPayload};

/// Cache tiers in priority order, highest first.
///
/// Tier failures never escape: reads treat an erroring tier as empty and
/// writes log and move on to the next tier.
#[derive(Clone, Default)]
pub struct TierChain {
    tiers: Vec<Arc<dyn CacheTier>>,
}

impl TierChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a tier with lower priority than those already present.
    pub fn with_tier(mut self, tier: Arc<dyn CacheTier>) -> Self {
        self.tiers.push(tier);
        self
    }

    /// Sources of the tiers, in priority order.
    pub fn sources(&self) -> Vec<CacheSource> {
        self.tiers.iter().map(|t| t.source()).collect()
    }

    /// First payload that is still fresh at `now`.
    pub async fn fresh(
        &self,
        key: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Option<(CachedPayload, CacheSource)> {
        for tier in &self.tiers {
            match tier.try_get(key).await {
                Ok(Some(payload)) if payload.is_fresh_at(now, ttl) => {
                    debug!(tier = tier.name(), key, "Cache hit");
                    return Some((payload, tier.source()));
                }
                Ok(Some(_)) => debug!(tier = tier.name(), key, "Cache entry expired"),
                Ok(None) => debug!(tier = tier.name(), key, "Cache miss"),
                Err(e) => warn!(tier = tier.name(), key, error = %e, "Cache read error"),
            }
        }
        None
    }

    /// First payload of any age, from tiers whose source `accept` allows.
    pub async fn stale<F>(&self, key: &str, accept: F) -> Option<(CachedPayload, CacheSource)>
    where
        F: Fn(CacheSource) -> bool,
    {
        for tier in self.tiers.iter().filter(|t| accept(t.source())) {
            match tier.try_get(key).await {
                Ok(Some(payload)) => return Some((payload, tier.source())),
                Ok(None) => {}
                Err(e) => warn!(tier = tier.name(), key, error = %e, "Cache stale read error"),
            }
        }
        None
    }

    /// Writes `payload` into every tier.
    pub async fn store(&self, key: &str, payload: &CachedPayload, ttl: Duration) {
        for tier in &self.tiers {
            if let Err(e) = tier.try_set(key, payload, ttl).await {
                warn!(tier = tier.name(), key, error = %e, "Cache write error");
            }
        }
    }
}
