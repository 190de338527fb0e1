//! Client for the Allium Explorer saved query behind the facilitator
//! analytics.

mod client;

pub use client::{AlliumClient, AlliumConfig};
