//! App state: facilitator proxy, ecosystem loader, config.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, warn};

use x402_allium::{AlliumClient, AlliumConfig};
use x402_cache::{FacilitatorProxy, LocalTier, ProxyConfig, TierChain, UpstashConfig, UpstashTier};
use x402_core::constants::{DEFAULT_DURABLE_TIMEOUT_SECONDS, DEFAULT_ECOSYSTEM_DIR, DEFAULT_UPSTREAM_TIMEOUT_SECONDS};
use x402_core::error::Result;
use x402_core::traits::UpstreamSource;
use x402_ecosystem::EcosystemLoader;

/// Server configuration, normally read from the environment.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Upstream query client settings
    pub allium: AlliumConfig,
    /// Durable tier settings; `None` runs with the local tier only
    pub durable: Option<UpstashConfig>,
    /// Root of the ecosystem directory
    pub ecosystem_dir: PathBuf,
    /// Collapse concurrent upstream fetches
    pub single_flight: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            allium: AlliumConfig::new(None),
            durable: None,
            ecosystem_dir: PathBuf::from(DEFAULT_ECOSYSTEM_DIR),
            single_flight: true,
        }
    }
}

impl ApiConfig {
    /// Reads configuration from the environment, loading `.env` first.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let mut allium = AlliumConfig::new(std::env::var("ALLIUM_API_KEY").ok())
            .with_timeout(env_u64("UPSTREAM_TIMEOUT_SECS", DEFAULT_UPSTREAM_TIMEOUT_SECONDS));
        if let Some(endpoint) = env_first(&["ALLIUM_ENDPOINT"]) {
            allium = allium.with_endpoint(endpoint);
        }

        let durable = match (
            env_first(&["KV_REST_API_URL", "UPSTASH_REDIS_REST_URL"]),
            env_first(&["KV_REST_API_TOKEN", "UPSTASH_REDIS_REST_TOKEN"]),
        ) {
            (Some(url), Some(token)) => Some(
                UpstashConfig::new(url, token)
                    .with_timeout(env_u64("DURABLE_TIMEOUT_SECS", DEFAULT_DURABLE_TIMEOUT_SECONDS)),
            ),
            (None, None) => None,
            _ => {
                warn!("Durable cache URL and token must both be set, running with local cache only");
                None
            }
        };

        Self {
            allium,
            durable,
            ecosystem_dir: env_first(&["ECOSYSTEM_DATA_DIR"])
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ECOSYSTEM_DIR)),
            single_flight: std::env::var("SINGLE_FLIGHT")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        }
    }
}

/// First of `names` that is set to a non-blank value.
fn env_first(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

/// Reads a positive number of seconds, falling back to `default`.
fn env_u64(name: &str, default: u64) -> u64 {
    match std::env::var(name) {
        Ok(raw) => parse_secs(&raw).unwrap_or_else(|| {
            warn!(name, value = %raw, default, "Ignoring invalid numeric setting");
            default
        }),
        Err(_) => default,
    }
}

/// Zero is rejected; a zero timeout fails every request.
fn parse_secs(raw: &str) -> Option<u64> {
    raw.trim().parse().ok().filter(|secs| *secs > 0)
}

/// Shared state handed to every handler.
pub struct AppState {
    /// Configuration the state was built from
    pub config: ApiConfig,
    /// Facilitator data proxy
    pub proxy: FacilitatorProxy,
    /// Ecosystem directory loader
    pub ecosystem: EcosystemLoader,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Builds the upstream client, cache tiers and loader from `config`.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let upstream = AlliumClient::with_config(config.allium.clone())?;
        if !upstream.is_configured() {
            warn!("ALLIUM_API_KEY is not set, cache misses will be served stale or fail");
        }

        let mut tiers = TierChain::new();
        match &config.durable {
            Some(durable) => match UpstashTier::with_config(durable.clone()) {
                Ok(tier) => {
                    tiers = tiers.with_tier(Arc::new(tier));
                    info!("Durable cache tier enabled");
                }
                Err(e) => warn!(error = %e, "Invalid durable cache config, using local cache only"),
            },
            None => info!("Durable cache tier not configured, using local cache only"),
        }
        tiers = tiers.with_tier(Arc::new(LocalTier::new()));

        let proxy = FacilitatorProxy::with_config(
            tiers,
            Arc::new(upstream),
            ProxyConfig {
                single_flight: config.single_flight,
                ..Default::default()
            },
        );
        let ecosystem = EcosystemLoader::new(&config.ecosystem_dir);

        Ok(Self::from_parts(config, proxy, ecosystem))
    }

    /// Assembles state from prebuilt components.
    pub fn from_parts(config: ApiConfig, proxy: FacilitatorProxy, ecosystem: EcosystemLoader) -> Self {
        Self {
            config,
            proxy,
            ecosystem,
            started_at: Instant::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_secs() {
        assert_eq!(parse_secs("5"), Some(5));
        assert_eq!(parse_secs(" 5 "), Some(5));
        assert_eq!(parse_secs("0"), None);
        assert_eq!(parse_secs("abc"), None);
        assert_eq!(parse_secs("-3"), None);
        assert_eq!(parse_secs(""), None);
    }
}
