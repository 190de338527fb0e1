//! # x402 Core
//!
//! Core types, errors, and traits for the x402 facilitator analytics proxy.
//!
//! This crate provides the foundational building blocks used by all other x402 crates:
//!
//! - **Types**: Analytics payloads, cache entries, cache outcomes, ecosystem entries
//! - **Errors**: One error type covering configuration, upstream and cache failures
//! - **Constants**: Cache key, TTL, upstream endpoint, header names
//! - **Traits**: Seams for cache tiers and the upstream data source
//!
//! ## Example
//!
//! ```rust
//! use x402_core::{AnalyticsPayload, CachedPayload};
//!
//! let body = serde_json::json!({ "data": [] });
//! let payload = AnalyticsPayload::try_from(body).unwrap();
//! let entry = CachedPayload::new(payload);
//! assert!(entry.is_fresh_at(entry.stored_at, std::time::Duration::from_secs(3600)));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{Result, X402Error};
pub use traits::*;
pub use types::*;
