//! Two-tier read-through cache for x402 facilitator analytics.
//!
//! A durable tier shared between instances sits in front of a process-local
//! fallback slot. [`FacilitatorProxy`] walks the tiers, refreshes from the
//! upstream on a miss and serves stale data when the upstream is unusable.

mod chain;
mod local;
mod proxy;
mod single_flight;
mod upstash;

pub use chain::TierChain;
pub use local::LocalTier;
pub use proxy::{FacilitatorProxy, ProxyConfig};
pub use single_flight::{SharedResult, SingleFlight};
pub use upstash::{UpstashConfig, UpstashTier};
