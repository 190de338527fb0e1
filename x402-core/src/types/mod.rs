//! Domain types for x402.
//!
//! - [`AnalyticsPayload`]: Structurally validated upstream document
//! - [`CachedPayload`]: A payload plus the instant it was fetched
//! - [`CacheOutcome`]: What the proxy served and where it came from
//! - [`EcosystemEntry`]: One project in the ecosystem directory

mod payload;
mod cache;
mod ecosystem;

pub use payload::*;
pub use cache::*;
pub use ecosystem::*;
