//! # x402 Ecosystem
//!
//! Directory of projects built around x402, stored as one JSON file per
//! project:
//!
//! ```text
//! data/ecosystem/
//! ├── client-integrations/
//! │   ├── some-sdk.json
//! │   └── .gitkeep
//! ├── facilitators/
//! │   └── coinbase.json
//! └── ...
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use x402_ecosystem::EcosystemLoader;
//! use x402_core::types::CategorySlug;
//!
//! let loader = EcosystemLoader::new("data/ecosystem");
//! let facilitators = loader.entries_by_category(CategorySlug::Facilitators).await;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod loader;

pub use loader::{CategoryGroup, EcosystemLoader};
