//! JSON-over-HTTP fetching shared by connectors and the issuer resolver.
//!
//! # Responsibilities
//! - Send GET requests with the configured `User-Agent`
//! - Bound every request with the configured timeout
//! - Classify non-success statuses separately from transport failures

use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::blockchain::LookupError;
use crate::config::HttpConfig;

/// Errors from a single GET request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Server answered with a non-success status.
    #[error("{url} returned status {status}")]
    RemoteUnavailable { url: String, status: u16 },

    /// Connection, timeout or body read failed.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Body arrived but is not JSON (e.g. an HTML rate-limit page).
    #[error("{url} returned a non-JSON body: {reason}")]
    UndecodableBody {
        url: String,
        reason: String,
        body: String,
    },
}

impl From<FetchError> for LookupError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::RemoteUnavailable { url, status } => {
                LookupError::RemoteUnavailable { url, status }
            }
            FetchError::Transport { url, source } => LookupError::Transport { url, source },
            FetchError::UndecodableBody { url, reason, body } => {
                LookupError::MalformedTransaction {
                    reason: format!("{url} returned a non-JSON body: {reason}"),
                    raw: Value::String(body),
                }
            }
        }
    }
}

/// HTTP client returning decoded JSON bodies.
///
/// Cheap to clone; holds no per-call state.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpClient {
    /// Create a client from configuration.
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(timeout)
            .build()?;

        Ok(Self { client, timeout })
    }

    /// Request timeout applied to every call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` and decode the body as JSON.
    pub async fn get_json(&self, url: &Url) -> Result<Value, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(url = %url, status = status.as_u16(), "Error looking up url");
            return Err(FetchError::RemoteUnavailable {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let text = response.text().await.map_err(transport)?;
        let body = serde_json::from_str::<Value>(&text).map_err(|e| {
            tracing::error!(url = %url, error = %e, "Response body is not JSON");
            FetchError::UndecodableBody {
                url: url.to_string(),
                reason: e.to_string(),
                body: text.clone(),
            }
        })?;
        tracing::debug!(url = %url, "Found results");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_maps_to_lookup_error() {
        let err: LookupError = FetchError::RemoteUnavailable {
            url: "https://example.com/tx".to_string(),
            status: 404,
        }
        .into();
        assert!(matches!(
            err,
            LookupError::RemoteUnavailable { status: 404, .. }
        ));
    }

    #[test]
    fn test_undecodable_body_maps_to_malformed() {
        let err: LookupError = FetchError::UndecodableBody {
            url: "https://example.com/tx".to_string(),
            reason: "expected value at line 1 column 1".to_string(),
            body: "<html>slow down</html>".to_string(),
        }
        .into();
        match err {
            LookupError::MalformedTransaction { raw, .. } => {
                assert_eq!(raw, Value::String("<html>slow down</html>".to_string()));
            }
            other => panic!("expected MalformedTransaction, got {other:?}"),
        }
    }

    #[test]
    fn test_client_uses_configured_timeout() {
        let config = HttpConfig {
            timeout_secs: 3,
            ..HttpConfig::default()
        };
        let client = HttpClient::new(&config).unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(3));
    }
}
