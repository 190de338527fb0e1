//! Cache entry and cache outcome types.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use super::AnalyticsPayload;

// ═══════════════════════════════════════════════════════════════════════════════
// CACHED PAYLOAD
// ═══════════════════════════════════════════════════════════════════════════════

/// A validated payload together with the instant it was fetched.
///
/// # Stored Format
/// ```text
/// { "data": <upstream document>, "timestamp": <unix millis> }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CachedPayload {
    /// The upstream document
    pub data: AnalyticsPayload,
    /// When the document was fetched from upstream
    #[serde(rename = "timestamp", with = "chrono::serde::ts_milliseconds")]
    pub stored_at: DateTime<Utc>,
}

impl CachedPayload {
    /// Wraps a freshly fetched payload, stamped with the current time.
    ///
    /// The stamp is truncated to milliseconds so it survives the stored format.
    pub fn new(data: AnalyticsPayload) -> Self {
        Self::with_stored_at(data, Utc::now().trunc_subsecs(3))
    }

    /// Wraps a payload with an explicit storage instant.
    pub fn with_stored_at(data: AnalyticsPayload, stored_at: DateTime<Utc>) -> Self {
        Self { data, stored_at }
    }

    /// Time elapsed between storage and `now`. Zero if `now` precedes storage.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.stored_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// Whole seconds elapsed between storage and `now`.
    pub fn age_secs_at(&self, now: DateTime<Utc>) -> u64 {
        self.age_at(now).as_secs()
    }

    /// Whether the payload may still satisfy a HIT at `now`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.age_at(now) < ttl
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// OUTCOME ATTRIBUTES
// ═══════════════════════════════════════════════════════════════════════════════

/// How a request was satisfied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CacheStatus {
    /// Fresh payload from a cache tier
    Hit,
    /// Fresh payload from upstream
    Miss,
    /// Expired payload served because upstream could not be used
    Stale,
}

impl CacheStatus {
    /// Header value.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Stale => "STALE",
        }
    }
}

impl fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which tier a cached payload came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CacheSource {
    /// Shared store that outlives the process
    Durable,
    /// In-process slot
    LocalFallback,
}

impl CacheSource {
    /// Header value.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheSource::Durable => "durable",
            CacheSource::LocalFallback => "local-fallback",
        }
    }
}

impl fmt::Display for CacheSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a stale payload was served.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StaleReason {
    /// The upstream credential is not configured
    MissingCredential,
    /// The upstream call failed or returned an invalid body
    FetchError,
}

impl StaleReason {
    /// Header value.
    pub fn as_str(&self) -> &'static str {
        match self {
            StaleReason::MissingCredential => "missing-credential",
            StaleReason::FetchError => "fetch-error",
        }
    }
}

impl fmt::Display for StaleReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE OUTCOME
// ═══════════════════════════════════════════════════════════════════════════════

/// The payload served for one request plus its cache attribution.
///
/// Use the constructors; they decide which attributes exist for each status:
///
/// | Status | source | age_secs | stale_reason |
/// |--------|--------|----------|--------------|
/// | HIT    | yes    | yes      | no           |
/// | MISS   | no     | no       | no           |
/// | STALE  | yes    | no       | yes          |
#[derive(Clone, Debug)]
pub struct CacheOutcome {
    /// The payload served
    pub payload: Arc<CachedPayload>,
    /// How the request was satisfied
    pub status: CacheStatus,
    /// Tier the payload came from
    pub source: Option<CacheSource>,
    /// Whole seconds since storage
    pub age_secs: Option<u64>,
    /// Why a stale payload was served
    pub stale_reason: Option<StaleReason>,
}

impl CacheOutcome {
    /// Fresh payload read from `source`.
    pub fn hit(payload: impl Into<Arc<CachedPayload>>, source: CacheSource, now: DateTime<Utc>) -> Self {
        let payload = payload.into();
        let age_secs = payload.age_secs_at(now);
        Self {
            payload,
            status: CacheStatus::Hit,
            source: Some(source),
            age_secs: Some(age_secs),
            stale_reason: None,
        }
    }

    /// Payload just fetched from upstream.
    pub fn miss(payload: impl Into<Arc<CachedPayload>>) -> Self {
        Self {
            payload: payload.into(),
            status: CacheStatus::Miss,
            source: None,
            age_secs: None,
            stale_reason: None,
        }
    }

    /// Payload of any age read from `source` because upstream was unusable.
    pub fn stale(
        payload: impl Into<Arc<CachedPayload>>,
        source: CacheSource,
        reason: StaleReason,
    ) -> Self {
        Self {
            payload: payload.into(),
            status: CacheStatus::Stale,
            source: Some(source),
            age_secs: None,
            stale_reason: Some(reason),
        }
    }

    /// The upstream document served.
    pub fn data(&self) -> &AnalyticsPayload {
        &self.payload.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use serde_json::json;

    const TTL: Duration = Duration::from_secs(3600);

    fn payload() -> AnalyticsPayload {
        AnalyticsPayload::try_from(json!({ "data": [] })).unwrap()
    }

    fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_stored_format() {
        let entry = CachedPayload::with_stored_at(payload(), epoch());
        let value = serde_json::to_value(&entry).unwrap();

        assert_eq!(value["timestamp"], json!(1_704_067_200_000i64));
        assert_eq!(value["data"], json!({ "data": [] }));

        let back: CachedPayload = serde_json::from_value(value).unwrap();
        assert_eq!(back, entry);
    }

    #[test]
    fn test_stored_format_rejects_invalid_data() {
        let blob = json!({ "data": { "data": "nope" }, "timestamp": 0 });
        assert!(serde_json::from_value::<CachedPayload>(blob).is_err());
    }

    #[test]
    fn test_new_truncates_to_millis() {
        let entry = CachedPayload::new(payload());
        assert_eq!(entry.stored_at.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_age() {
        let entry = CachedPayload::with_stored_at(payload(), epoch());
        let later = epoch() + chrono::Duration::milliseconds(90_900);

        assert_eq!(entry.age_secs_at(later), 90);
        assert_eq!(entry.age_secs_at(epoch() - chrono::Duration::seconds(5)), 0);
    }

    #[test]
    fn test_freshness_boundary() {
        let entry = CachedPayload::with_stored_at(payload(), epoch());

        assert!(entry.is_fresh_at(epoch() + chrono::Duration::seconds(3599), TTL));
        assert!(!entry.is_fresh_at(epoch() + chrono::Duration::seconds(3600), TTL));
        assert!(!entry.is_fresh_at(epoch() + chrono::Duration::hours(5), TTL));
    }

    proptest! {
        #[test]
        fn prop_fresh_iff_age_below_ttl(age_ms in 0i64..10_000_000) {
            let entry = CachedPayload::with_stored_at(payload(), epoch());
            let now = epoch() + chrono::Duration::milliseconds(age_ms);
            prop_assert_eq!(entry.is_fresh_at(now, TTL), age_ms < 3_600_000);
        }
    }

    #[test]
    fn test_outcome_attributes() {
        let entry = CachedPayload::with_stored_at(payload(), epoch());
        let now = epoch() + chrono::Duration::seconds(42);

        let hit = CacheOutcome::hit(entry.clone(), CacheSource::Durable, now);
        assert_eq!(hit.status, CacheStatus::Hit);
        assert_eq!(hit.age_secs, Some(42));
        assert_eq!(hit.stale_reason, None);

        let miss = CacheOutcome::miss(entry.clone());
        assert_eq!(miss.source, None);
        assert_eq!(miss.age_secs, None);

        let stale = CacheOutcome::stale(entry, CacheSource::LocalFallback, StaleReason::FetchError);
        assert_eq!(stale.status, CacheStatus::Stale);
        assert_eq!(stale.source, Some(CacheSource::LocalFallback));
        assert_eq!(stale.age_secs, None);
    }

    #[test]
    fn test_header_values() {
        assert_eq!(CacheStatus::Stale.to_string(), "STALE");
        assert_eq!(CacheSource::LocalFallback.to_string(), "local-fallback");
        assert_eq!(StaleReason::MissingCredential.to_string(), "missing-credential");
        assert_eq!(serde_json::to_value(CacheSource::LocalFallback).unwrap(), json!("local-fallback"));
    }
}
