//! Durable tier backed by an Upstash-compatible Redis REST endpoint.
//!
//! Commands are sent as a JSON array to the endpoint root with bearer auth:
//!
//! ```text
//! POST {url}            ["GET", "facilitators-data"]
//! POST {url}            ["SET", "facilitators-data", "<json>", "EX", "3600"]
//! -> {"result": ...}  |  {"error": "..."}
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument, warn};

use x402_core::constants::DEFAULT_DURABLE_TIMEOUT_SECONDS;
use x402_core::error::{Result, X402Error};
use x402_core::traits::CacheTier;
use x402_core::types::{CacheSource, CachedPayload};

/// Durable tier connection settings.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct UpstashConfig {
    /// REST endpoint (e.g. "https://eu1-example.upstash.io")
    pub url: String,
    /// REST token
    pub token: String,
    /// Per-call timeout in seconds
    pub timeout_seconds: u64,
}

impl UpstashConfig {
    /// Creates config with the default timeout.
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            timeout_seconds: DEFAULT_DURABLE_TIMEOUT_SECONDS,
        }
    }

    /// Overrides the per-call timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

impl std::fmt::Debug for UpstashConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpstashConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Shared, durable cache tier.
pub struct UpstashTier {
    config: UpstashConfig,
    http_client: reqwest::Client,
}

impl UpstashTier {
    /// Creates a tier for the given endpoint.
    pub fn with_config(config: UpstashConfig) -> Result<Self> {
        url::Url::parse(&config.url)
            .map_err(|e| X402Error::ConfigError(format!("invalid durable cache URL: {}", e)))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| X402Error::ConfigError(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    #[instrument(skip_all, fields(command = %args.first().and_then(serde_json::Value::as_str).unwrap_or("?")))]
    async fn command(&self, args: &[Value]) -> Result<Value> {
        let response = self
            .http_client
            .post(&self.config.url)
            .bearer_auth(&self.config.token)
            .json(args)
            .send()
            .await
            .map_err(|e| X402Error::DurableCache(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(X402Error::DurableCache(format!("HTTP {}: {}", status, text)));
        }

        let body: UpstashResponse = response
            .json()
            .await
            .map_err(|e| X402Error::DurableCache(format!("unreadable response: {}", e)))?;

        if let Some(error) = body.error {
            return Err(X402Error::DurableCache(error));
        }

        Ok(body.result)
    }
}

#[async_trait]
impl CacheTier for UpstashTier {
    fn source(&self) -> CacheSource {
        CacheSource::Durable
    }

    fn name(&self) -> &str {
        "upstash"
    }

    async fn try_get(&self, key: &str) -> Result<Option<CachedPayload>> {
        let result = self.command(&[json!("GET"), json!(key)]).await?;

        let decoded = match result {
            Value::Null => return Ok(None),
            Value::String(blob) => serde_json::from_str::<CachedPayload>(&blob),
            other @ Value::Object(_) => serde_json::from_value::<CachedPayload>(other),
            other => {
                warn!(key, kind = ?other, "Unexpected durable cache value, ignoring");
                return Ok(None);
            }
        };

        match decoded {
            Ok(payload) => {
                debug!(key, stored_at = %payload.stored_at, "Durable cache entry found");
                Ok(Some(payload))
            }
            Err(e) => {
                warn!(key, error = %e, "Invalid durable cache entry, ignoring");
                Ok(None)
            }
        }
    }

    async fn try_set(&self, key: &str, payload: &CachedPayload, ttl: Duration) -> Result<()> {
        let blob = serde_json::to_string(payload)?;
        let expiry = ttl.as_secs().max(1).to_string();

        let result = self
            .command(&[json!("SET"), json!(key), json!(blob), json!("EX"), json!(expiry)])
            .await?;

        if result != "OK" {
            return Err(X402Error::DurableCache(format!("unexpected SET result: {}", result)));
        }

        debug!(key, ttl_secs = ttl.as_secs(), "Stored payload in durable cache");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct UpstashResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use wiremock::matchers::{body_json, header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use x402_core::types::AnalyticsPayload;

    fn entry() -> CachedPayload {
        CachedPayload::with_stored_at(
            AnalyticsPayload::try_from(json!({ "data": [{ "chain": "base" }] })).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        )
    }

    async fn tier(server: &MockServer) -> UpstashTier {
        UpstashTier::with_config(UpstashConfig::new(server.uri(), "secret-token")).unwrap()
    }

    #[test]
    fn test_rejects_invalid_url() {
        let result = UpstashTier::with_config(UpstashConfig::new("not a url", "t"));
        assert!(matches!(result, Err(X402Error::ConfigError(_))));
    }

    #[tokio::test]
    async fn test_get_string_blob() {
        let server = MockServer::start().await;
        let blob = serde_json::to_string(&entry()).unwrap();

        Mock::given(method("POST"))
            .and(header("authorization", "Bearer secret-token"))
            .and(body_json(json!(["GET", "facilitators-data"])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": blob })))
            .expect(1)
            .mount(&server)
            .await;

        let got = tier(&server).await.try_get("facilitators-data").await.unwrap();
        assert_eq!(got, Some(entry()));
    }

    #[tokio::test]
    async fn test_get_null_is_miss() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": null })))
            .mount(&server)
            .await;

        assert!(tier(&server).await.try_get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_get_corrupt_blob_is_miss() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "result": "{\"data\":{\"data\":7},\"timestamp\":0}" })),
            )
            .mount(&server)
            .await;

        assert!(tier(&server).await.try_get("k").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_error_body_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({ "error": "WRONGPASS invalid token" })),
            )
            .mount(&server)
            .await;

        let err = tier(&server).await.try_get("k").await.unwrap_err();
        assert!(matches!(err, X402Error::DurableCache(_)));
    }

    #[tokio::test]
    async fn test_set_sends_expiry() {
        let server = MockServer::start().await;
        let blob = serde_json::to_string(&entry()).unwrap();

        Mock::given(method("POST"))
            .and(body_json(json!(["SET", "facilitators-data", blob, "EX", "3600"])))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": "OK" })))
            .expect(1)
            .mount(&server)
            .await;

        tier(&server)
            .await
            .try_set("facilitators-data", &entry(), Duration::from_secs(3600))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_set_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = tier(&server)
            .await
            .try_set("k", &entry(), Duration::from_secs(60))
            .await
            .unwrap_err();
        assert!(matches!(err, X402Error::DurableCache(_)));
    }

    #[tokio::test]
    async fn test_unreachable_is_error() {
        let tier = UpstashTier::with_config(
            UpstashConfig::new("http://127.0.0.1:9", "t").with_timeout(1),
        )
        .unwrap();

        let err = tier.try_get("k").await.unwrap_err();
        assert!(matches!(err, X402Error::DurableCache(_)));
    }
}
