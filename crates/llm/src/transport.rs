//! HTTP transport for OpenAI-compatible gateways.
//!
//! Chat and embedding calls share one request routine: join the endpoint
//! path onto the base URL, attach bearer auth and any correlation headers,
//! POST the JSON body, reject non-success statuses and decode the typed
//! response. Timeout policy lives here and nowhere else.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use toolrag_core::{AppError, AppResult};

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Shared JSON-over-HTTP client for one gateway.
#[derive(Debug, Clone)]
pub struct GatewayTransport {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GatewayTransport {
    /// Create a transport for `base_url`; a trailing slash is dropped.
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout_secs: Option<u64>,
    ) -> AppResult<Self> {
        let timeout = Duration::from_secs(timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an endpoint path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// POST `body` as JSON to `path` and decode the response as `Resp`.
    pub async fn post_json<Req, Resp>(
        &self,
        path: &str,
        body: &Req,
        headers: &[(String, String)],
    ) -> AppResult<Resp>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = self.url(path);
        tracing::debug!("POST {}", url);

        let mut request = self.client.post(&url).json(body);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Provider(format!(
                "Gateway error ({}) from {}: {}",
                status, url, error_text
            )));
        }

        response
            .json::<Resp>()
            .await
            .map_err(|e| {
                AppError::Provider(format!("Failed to parse response from {}: {}", url, e))
            })
    }
}
