//! HTTP client for the patch-generation service

use crate::error::{RemoteError, RemoteResult};
use crate::messages::{PatchInstruction, PatchRequest};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client as HttpClient, StatusCode, Url};
use std::time::Duration;
use tracing::{debug, trace};

/// Header sent by default to skip the tunnel provider's browser warning page
pub const DEFAULT_BYPASS_HEADER: (&str, &str) = ("ngrok-skip-browser-warning", "true");

/// Anything that turns a [`PatchRequest`] into a [`PatchInstruction`].
#[async_trait]
pub trait PatchProvider: Send + Sync {
    async fn generate(&self, request: &PatchRequest) -> RemoteResult<PatchInstruction>;
}

/// Client for the remote patch-generation service
pub struct PatchServiceClient {
    /// HTTP client for requests
    http_client: HttpClient,

    /// Service endpoint receiving the POST
    endpoint: Url,

    /// Headers added to every request
    headers: HeaderMap,

    /// Request timeout
    timeout: Duration,
}

/// Builder for the patch service client
pub struct PatchServiceClientBuilder {
    endpoint: String,
    timeout: Duration,
    bypass_header: Option<(String, String)>,
    extra_headers: Vec<(String, String)>,
}

impl PatchServiceClientBuilder {
    /// Create a new builder
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(30),
            bypass_header: Some((
                DEFAULT_BYPASS_HEADER.0.to_string(),
                DEFAULT_BYPASS_HEADER.1.to_string(),
            )),
            extra_headers: Vec::new(),
        }
    }

    /// Set request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Replace the interstitial-bypass header. `None` sends no bypass header.
    pub fn with_bypass_header(mut self, header: Option<(String, String)>) -> Self {
        self.bypass_header = header;
        self
    }

    /// Add an arbitrary header to every request
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    /// Build the client
    pub fn build(self) -> RemoteResult<PatchServiceClient> {
        let endpoint = Url::parse(&self.endpoint)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (name, value) in self.bypass_header.iter().chain(&self.extra_headers) {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| RemoteError::Config(format!("invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| RemoteError::Config(format!("invalid header value: {e}")))?;
            headers.insert(name, value);
        }

        let http_client = HttpClient::builder().timeout(self.timeout).build()?;

        Ok(PatchServiceClient {
            http_client,
            endpoint,
            headers,
            timeout: self.timeout,
        })
    }
}

impl PatchServiceClient {
    /// Create a new client with default settings
    pub fn new(endpoint: impl Into<String>) -> RemoteResult<Self> {
        PatchServiceClientBuilder::new(endpoint).build()
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Request a patch for `request` from the service
    pub async fn request_patch(&self, request: &PatchRequest) -> RemoteResult<PatchInstruction> {
        debug!(
            endpoint = %self.endpoint,
            commit = %request.commit_hash,
            target = %request.target_version,
            "Requesting generated patch"
        );

        let response = self
            .http_client
            .post(self.endpoint.clone())
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();

        match status {
            status if status.is_success() => {
                let body = response.text().await?;
                trace!(status = %status, body_len = body.len(), "Received patch response");
                parse_instruction(&body)
            }

            StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => Err(RemoteError::Timeout(
                format!("patch service answered {}", status.as_u16()),
            )),

            status => {
                let body = response.text().await.unwrap_or_default();
                Err(RemoteError::Http {
                    url: self.endpoint.to_string(),
                    status: status.as_u16(),
                    body,
                })
            }
        }
    }
}

#[async_trait]
impl PatchProvider for PatchServiceClient {
    async fn generate(&self, request: &PatchRequest) -> RemoteResult<PatchInstruction> {
        self.request_patch(request).await
    }
}

fn parse_instruction(body: &str) -> RemoteResult<PatchInstruction> {
    if body.trim().is_empty() {
        return Err(RemoteError::Serialization(
            "patch service returned an empty body".to_string(),
        ));
    }

    serde_json::from_str(body).map_err(|e| {
        RemoteError::Serialization(format!("Failed to parse response: {e}: {body}"))
    })
}
