//! Allium Explorer client.
//!
//! Runs the saved facilitator query with an empty parameter object and
//! returns the body once it has the expected `{"data": [...]}` shape.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, instrument, warn};

use x402_core::constants::{ALLIUM_API_KEY_HEADER, ALLIUM_ENDPOINT, DEFAULT_UPSTREAM_TIMEOUT_SECONDS};
use x402_core::error::{Result, X402Error};
use x402_core::traits::UpstreamSource;
use x402_core::types::AnalyticsPayload;

/// Allium client configuration.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
pub struct AlliumConfig {
    /// Query run endpoint
    pub endpoint: String,
    /// API key sent as `X-API-KEY`; `None` leaves the client unconfigured
    pub api_key: Option<String>,
    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl AlliumConfig {
    /// Creates config for the production query endpoint.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            endpoint: ALLIUM_ENDPOINT.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout_seconds: DEFAULT_UPSTREAM_TIMEOUT_SECONDS,
        }
    }

    /// Points the client at a different endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Overrides the request timeout.
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }
}

impl std::fmt::Debug for AlliumConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlliumConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Client for the facilitator analytics query.
pub struct AlliumClient {
    config: AlliumConfig,
    http_client: reqwest::Client,
}

impl AlliumClient {
    /// Creates a client with the given config.
    pub fn with_config(config: AlliumConfig) -> Result<Self> {
        url::Url::parse(&config.endpoint)
            .map_err(|e| X402Error::ConfigError(format!("invalid Allium endpoint: {}", e)))?;

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| X402Error::ConfigError(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Runs the query once.
    #[instrument(skip(self), fields(endpoint = %self.config.endpoint))]
    pub async fn run_query(&self) -> Result<AnalyticsPayload> {
        let api_key = self.config.api_key.as_deref().ok_or(X402Error::MissingApiKey)?;

        let response = self
            .http_client
            .post(&self.config.endpoint)
            .header(ALLIUM_API_KEY_HEADER, api_key)
            .json(&json!({}))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    X402Error::ConnectionTimeout(format!(
                        "Allium query exceeded {}s",
                        self.config.timeout_seconds
                    ))
                } else {
                    X402Error::HttpError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("Unknown").to_string();
            warn!(status = status.as_u16(), %reason, "Allium query rejected");
            return Err(X402Error::UpstreamStatus {
                status: status.as_u16(),
                reason,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| X402Error::HttpError(e.to_string()))?;

        let payload = AnalyticsPayload::from_slice(&bytes)?;
        debug!(rows = payload.row_count(), "Allium query succeeded");
        Ok(payload)
    }
}

#[async_trait]
impl UpstreamSource for AlliumClient {
    fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    async fn fetch(&self) -> Result<AnalyticsPayload> {
        self.run_query().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const QUERY_PATH: &str = "/api/v1/explorer/queries/test/run";

    fn client(server: &MockServer) -> AlliumClient {
        let config = AlliumConfig::new(Some("test-key".into()))
            .with_endpoint(format!("{}{}", server.uri(), QUERY_PATH));
        AlliumClient::with_config(config).unwrap()
    }

    async fn respond(server: &MockServer, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(QUERY_PATH))
            .respond_with(template)
            .mount(server)
            .await;
    }

    #[test]
    fn test_blank_key_is_unconfigured() {
        let client = AlliumClient::with_config(AlliumConfig::new(Some("  ".into()))).unwrap();
        assert!(!client.is_configured());

        let client = AlliumClient::with_config(AlliumConfig::new(None)).unwrap();
        assert!(!client.is_configured());
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = AlliumConfig::new(Some("super-secret".into()));
        assert!(!format!("{:?}", config).contains("super-secret"));
    }

    #[test]
    fn test_rejects_invalid_endpoint() {
        let config = AlliumConfig::new(Some("k".into())).with_endpoint("::not a url");
        assert!(matches!(
            AlliumClient::with_config(config),
            Err(X402Error::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_sends_key_and_empty_body() {
        let server = MockServer::start().await;
        let body = json!({ "data": [{ "chain": "base", "facilitator": "coinbase" }] });

        Mock::given(method("POST"))
            .and(path(QUERY_PATH))
            .and(header("x-api-key", "test-key"))
            .and(body_json(json!({})))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let payload = client(&server).fetch().await.unwrap();
        assert_eq!(payload.as_value(), &body);
        assert_eq!(payload.row_count(), 1);
    }

    #[tokio::test]
    async fn test_extra_fields_pass_through() {
        let server = MockServer::start().await;
        let body = json!({ "data": [], "sql": "select 1", "meta": { "columns": [] } });
        respond(&server, ResponseTemplate::new(200).set_body_json(body.clone())).await;

        let payload = client(&server).fetch().await.unwrap();
        assert_eq!(payload.into_value(), body);
    }

    #[tokio::test]
    async fn test_non_success_status() {
        let server = MockServer::start().await;
        respond(&server, ResponseTemplate::new(503)).await;

        let err = client(&server).fetch().await.unwrap_err();
        match err {
            X402Error::UpstreamStatus { status, reason } => {
                assert_eq!(status, 503);
                assert_eq!(reason, "Service Unavailable");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_wrong_shape_is_invalid_payload() {
        let server = MockServer::start().await;
        respond(
            &server,
            ResponseTemplate::new(200).set_body_json(json!({ "data": { "rows": [] } })),
        )
        .await;

        let err = client(&server).fetch().await.unwrap_err();
        assert!(matches!(err, X402Error::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn test_non_json_body_is_invalid_payload() {
        let server = MockServer::start().await;
        respond(&server, ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;

        let err = client(&server).fetch().await.unwrap_err();
        assert!(matches!(err, X402Error::InvalidPayload(_)));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let server = MockServer::start().await;
        respond(
            &server,
            ResponseTemplate::new(200)
                .set_body_json(json!({ "data": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .await;

        let config = AlliumConfig::new(Some("k".into()))
            .with_endpoint(format!("{}{}", server.uri(), QUERY_PATH))
            .with_timeout(1);
        let err = AlliumClient::with_config(config).unwrap().fetch().await.unwrap_err();
        assert!(matches!(err, X402Error::ConnectionTimeout(_)));
    }

    #[tokio::test]
    async fn test_unconfigured_fetch_does_not_call_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(Value::Null))
            .expect(0)
            .mount(&server)
            .await;

        let config = AlliumConfig::new(None).with_endpoint(server.uri());
        let err = AlliumClient::with_config(config).unwrap().fetch().await.unwrap_err();
        assert!(matches!(err, X402Error::MissingApiKey));
    }
}
