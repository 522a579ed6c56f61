//! Base JSON-RPC 2.0 HTTP client.
//!
//! Provides `call_raw()` for a single JSON-RPC round-trip (POST to
//! `/json_rpc`) and `call()`, which also decodes the result. Every call is
//! exactly one HTTP request; nothing is retried.

use crate::envelope;
use crate::error::RpcError;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::value::RawValue;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Path of the JSON-RPC endpoint on a wallet RPC server.
pub const JSON_RPC_PATH: &str = "/json_rpc";

/// Longest slice of an error body kept for diagnostics.
const MAX_ERROR_BODY: usize = 500;

/// Configuration for an RPC client.
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// Base URL (e.g., `http://localhost:18083`) or the full `/json_rpc`
    /// endpoint.
    pub url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:18083".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Async JSON-RPC client for a wallet RPC server.
///
/// Holds no mutable state besides the request-id counter, so one instance
/// can be shared between tasks.
pub struct RpcClient {
    client: reqwest::Client,
    config: RpcConfig,
    endpoint: String,
    request_id: AtomicU64,
}

impl RpcClient {
    /// Create a new client with the given URL.
    pub fn new(url: &str) -> Result<Self, RpcError> {
        Self::with_config(RpcConfig {
            url: url.to_string(),
            ..Default::default()
        })
    }

    /// Create a new client with full configuration.
    pub fn with_config(config: RpcConfig) -> Result<Self, RpcError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(RpcError::Client)?;
        Ok(Self::with_http_client(config, client))
    }

    /// Create a client on top of an existing `reqwest::Client`.
    ///
    /// `config.timeout` is not applied here; the supplied client's own
    /// settings are used as-is.
    pub fn with_http_client(mut config: RpcConfig, client: reqwest::Client) -> Self {
        config.url = config.url.trim_end_matches('/').to_string();
        let endpoint = if config.url.ends_with(JSON_RPC_PATH) {
            config.url.clone()
        } else {
            format!("{}{}", config.url, JSON_RPC_PATH)
        };

        Self {
            client,
            config,
            endpoint,
            request_id: AtomicU64::new(0),
        }
    }

    /// Get the configured base URL.
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Full URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn next_id(&self) -> u64 {
        self.request_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Call a JSON-RPC 2.0 method and decode its result into `R`.
    pub async fn call<P, R>(&self, method: &str, params: Option<P>) -> Result<R, RpcError>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        let raw = self.call_raw(method, params.as_ref()).await?;
        envelope::decode_result(method, &raw)
    }

    /// Call a JSON-RPC 2.0 method and return its result undecoded.
    pub async fn call_raw<P: Serialize>(
        &self,
        method: &str,
        params: Option<&P>,
    ) -> Result<Box<RawValue>, RpcError> {
        let id = self.next_id();
        let body = envelope::encode_request(method, params, id)?;

        log::debug!("wallet rpc {} (id {}) -> {}", method, id, self.endpoint);

        let resp = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .body(body)
            .send()
            .await
            .map_err(|e| self.http_error(method, e))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(RpcError::HttpStatus {
                method: method.to_string(),
                url: self.endpoint.clone(),
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| self.http_error(method, e))?;

        log::trace!(
            "wallet rpc {} (id {}) <- HTTP {}, {} bytes",
            method,
            id,
            status.as_u16(),
            bytes.len()
        );

        envelope::decode_response(method, &bytes, Some(id))?.into_result(method)
    }

    fn http_error(&self, method: &str, source: reqwest::Error) -> RpcError {
        RpcError::Http {
            method: method.to_string(),
            url: self.endpoint.clone(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = RpcConfig::default();
        assert_eq!(config.url, "http://127.0.0.1:18083");
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_client_url() {
        let client = RpcClient::new("http://example.com:18083/").unwrap();
        assert_eq!(client.url(), "http://example.com:18083");
        assert_eq!(client.endpoint(), "http://example.com:18083/json_rpc");
    }

    #[test]
    fn test_full_endpoint_is_kept() {
        let client = RpcClient::new("http://example.com:18083/json_rpc").unwrap();
        assert_eq!(client.endpoint(), "http://example.com:18083/json_rpc");
    }

    #[test]
    fn test_request_ids_increment() {
        let client = RpcClient::new("http://localhost:18083").unwrap();
        let id1 = client.next_id();
        let id2 = client.next_id();
        assert_eq!(id2, id1 + 1);
    }

    #[test]
    fn test_client_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RpcClient>();
    }
}
