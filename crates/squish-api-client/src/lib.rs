//! HTTP client for the squish compression service.
//!
//! Wraps a `reqwest::Client` bound to one base URL and exposes the three
//! service endpoints: multipart compression, usage stats and the health probe.

pub mod api;
pub mod error;

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use squish_core::ClientConfig;

pub use api::{CompressedFile, StatsMode};
pub use error::ApiError;

/// HTTP client for the compression service.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: Option<serde_json::Value>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("squish/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-2xx response into [`ApiError::Server`], pulling the `error`
    /// field out of a JSON body when there is one.
    async fn server_error(response: reqwest::Response) -> ApiError {
        let status = response.status().as_u16();
        let message = match response.bytes().await {
            Ok(body) => serde_json::from_slice::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error)
                .and_then(|value| match value {
                    serde_json::Value::String(s) => Some(s),
                    serde_json::Value::Null | serde_json::Value::Bool(false) => None,
                    other => Some(other.to_string()),
                })
                .filter(|s| !s.is_empty()),
            Err(e) => {
                tracing::warn!(error = %e, status, "Failed to read error response body");
                None
            }
        };

        ApiError::Server { status, message }
    }
}
