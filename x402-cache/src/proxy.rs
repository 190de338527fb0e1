//! Facilitator data proxy.
//!
//! Serves the facilitator analytics payload with as few upstream calls as
//! possible. Degradation order for one request:
//!
//! ```text
//! durable fresh -> local fresh -> upstream -> durable stale -> local stale -> error
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, instrument};

use x402_core::constants::{CACHE_KEY, CACHE_TTL_SECONDS};
use x402_core::error::{Result, X402Error};
use x402_core::traits::UpstreamSource;
use x402_core::types::{CacheOutcome, CacheSource, CachedPayload, StaleReason};

use crate::chain::TierChain;
use crate::single_flight::{SharedResult, SingleFlight};

/// Proxy configuration.
#[derive(Clone, Debug)]
pub struct ProxyConfig {
    /// Key used in every tier
    pub cache_key: String,
    /// Freshness window, also the durable expiration
    pub ttl: Duration,
    /// Collapse concurrent upstream fetches into one
    pub single_flight: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            cache_key: CACHE_KEY.to_string(),
            ttl: Duration::from_secs(CACHE_TTL_SECONDS),
            single_flight: true,
        }
    }
}

/// Read-through proxy in front of the upstream analytics source.
///
/// Built once at startup and shared by reference across requests. Apart
/// from the tiers it writes to, it keeps no per-request state.
pub struct FacilitatorProxy {
    tiers: TierChain,
    upstream: Arc<dyn UpstreamSource>,
    flight: SingleFlight<Arc<CachedPayload>>,
    config: ProxyConfig,
}

impl FacilitatorProxy {
    /// Creates a proxy with default configuration.
    pub fn new(tiers: TierChain, upstream: Arc<dyn UpstreamSource>) -> Self {
        Self::with_config(tiers, upstream, ProxyConfig::default())
    }

    /// Creates a proxy with custom configuration.
    pub fn with_config(tiers: TierChain, upstream: Arc<dyn UpstreamSource>, config: ProxyConfig) -> Self {
        info!(
            tiers = ?tiers.sources(),
            ttl_secs = config.ttl.as_secs(),
            single_flight = config.single_flight,
            "Facilitator proxy ready"
        );

        Self {
            tiers,
            upstream,
            flight: SingleFlight::new(),
            config,
        }
    }

    /// The tiers this proxy reads and writes.
    pub fn tiers(&self) -> &TierChain {
        &self.tiers
    }

    /// Returns the current facilitator payload and how it was obtained.
    ///
    /// Makes at most one upstream call. Errors only when no payload can be
    /// served: [`X402Error::MissingApiKey`] when the credential is absent and
    /// the local tier is empty, [`X402Error::NoCachedData`] when upstream
    /// failed and every tier is empty.
    #[instrument(skip(self), fields(key = %self.config.cache_key))]
    pub async fn get_facilitator_data(&self) -> Result<CacheOutcome> {
        let key = self.config.cache_key.as_str();
        let now = Utc::now();

        if let Some((payload, source)) = self.tiers.fresh(key, self.config.ttl, now).await {
            return Ok(CacheOutcome::hit(payload, source, now));
        }

        if !self.upstream.is_configured() {
            error!("ALLIUM_API_KEY environment variable is not set");
            return match self.tiers.stale(key, |s| s == CacheSource::LocalFallback).await {
                Some((payload, source)) => Ok(CacheOutcome::stale(
                    payload,
                    source,
                    StaleReason::MissingCredential,
                )),
                None => Err(X402Error::MissingApiKey),
            };
        }

        match self.refresh().await {
            Ok(payload) => Ok(CacheOutcome::miss(payload)),
            Err(e) => {
                error!(error = %e, "Failed to fetch facilitator data");
                match self.tiers.stale(key, |_| true).await {
                    Some((payload, source)) => {
                        Ok(CacheOutcome::stale(payload, source, StaleReason::FetchError))
                    }
                    None => Err(X402Error::NoCachedData),
                }
            }
        }
    }

    async fn refresh(&self) -> SharedResult<Arc<CachedPayload>> {
        let key = self.config.cache_key.as_str();
        let fetch = move || async move {
            let data = self.upstream.fetch().await?;
            let payload = CachedPayload::new(data);
            self.tiers.store(key, &payload, self.config.ttl).await;
            debug!(rows = payload.data.row_count(), "Stored fresh facilitator data");
            Ok::<_, X402Error>(Arc::new(payload))
        };

        if self.config.single_flight {
            self.flight.run(key, fetch).await
        } else {
            fetch().await.map_err(Arc::new)
        }
    }
}
