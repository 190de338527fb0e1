//! Process-local fallback tier.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use x402_core::error::Result;
use x402_core::traits::CacheTier;
use x402_core::types::{CacheSource, CachedPayload};

/// A single in-memory slot holding the last payload written.
///
/// Construct one per process and share it by `Arc` through the application
/// state. Concurrent writers race and the last write wins. The slot has no
/// expiry of its own: the value stays until overwritten and readers apply
/// the TTL.
#[derive(Debug, Default)]
pub struct LocalTier {
    slot: RwLock<Option<(String, CachedPayload)>>,
}

impl LocalTier {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored payload regardless of key.
    pub fn peek(&self) -> Option<CachedPayload> {
        self.slot.read().as_ref().map(|(_, payload)| payload.clone())
    }

    /// Returns true if nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.slot.read().is_none()
    }
}

#[async_trait]
impl CacheTier for LocalTier {
    fn source(&self) -> CacheSource {
        CacheSource::LocalFallback
    }

    fn name(&self) -> &str {
        "local"
    }

    async fn try_get(&self, key: &str) -> Result<Option<CachedPayload>> {
        let slot = self.slot.read();
        Ok(slot
            .as_ref()
            .filter(|(stored_key, _)| stored_key == key)
            .map(|(_, payload)| payload.clone()))
    }

    async fn try_set(&self, key: &str, payload: &CachedPayload, _ttl: Duration) -> Result<()> {
        *self.slot.write() = Some((key.to_string(), payload.clone()));
        Ok(())
    }
}
