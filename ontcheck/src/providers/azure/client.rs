//! Azure `OpenAI` API client implementation.

use super::completion::CompletionModel;
use crate::error::{ConfigError, Result};
use crate::providers::HttpClientConfig;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use std::sync::Arc;

/// API version sent when none is configured.
pub const DEFAULT_API_VERSION: &str = "2024-02-15-preview";

/// Azure `OpenAI` client for creating completion models.
///
/// # Example
///
/// ```rust,ignore
/// use ontcheck::providers::azure::AzureOpenAIClient;
///
/// let client = AzureOpenAIClient::builder()
///     .endpoint("https://my-resource.openai.azure.com")
///     .api_key("...")
///     .api_version("2024-02-15-preview")
///     .build()?;
/// let model = client.completion_model("gpt-4o");
/// ```
#[derive(Clone)]
pub struct AzureOpenAIClient {
    http_client: reqwest::Client,
    api_key: HeaderValue,
    endpoint: Arc<str>,
    api_version: Arc<str>,
}

impl std::fmt::Debug for AzureOpenAIClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureOpenAIClient")
            .field("endpoint", &self.endpoint)
            .field("api_version", &self.api_version)
            .field("api_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

impl AzureOpenAIClient {
    /// Create a client for `endpoint` with the default API version.
    ///
    /// # Errors
    ///
    /// See [`AzureOpenAIClientBuilder::build`].
    pub fn new(endpoint: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::builder().endpoint(endpoint).api_key(api_key).build()
    }

    /// Create a new client builder.
    #[must_use]
    pub fn builder() -> AzureOpenAIClientBuilder {
        AzureOpenAIClientBuilder::default()
    }

    /// Create a completion model for the named deployment.
    #[must_use]
    pub fn completion_model(&self, deployment: impl Into<String>) -> CompletionModel {
        CompletionModel::new(self.clone(), deployment)
    }

    /// The resource endpoint, without a trailing slash.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The `api-version` query value.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Base URL of a deployment.
    #[must_use]
    pub fn deployment_url(&self, deployment: &str) -> String {
        format!("{}/openai/deployments/{deployment}", self.endpoint)
    }

    /// Full chat completions URL of a deployment.
    #[must_use]
    pub fn chat_completions_url(&self, deployment: &str) -> String {
        format!(
            "{}/chat/completions?api-version={}",
            self.deployment_url(deployment),
            self.api_version
        )
    }

    pub(crate) const fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    pub(crate) fn auth_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert("api-key", self.api_key.clone());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }
}

/// Builder for [`AzureOpenAIClient`].
#[derive(Debug, Default)]
pub struct AzureOpenAIClientBuilder {
    endpoint: Option<String>,
    api_key: Option<String>,
    api_version: Option<String>,
    http: HttpClientConfig,
}

impl AzureOpenAIClientBuilder {
    /// Set the resource endpoint (e.g., `https://name.openai.azure.com`).
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the API key.
    #[must_use]
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the `api-version` query value.
    #[must_use]
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    /// Set the request timeout in seconds.
    #[must_use]
    pub const fn timeout_secs(mut self, timeout: Option<u64>) -> Self {
        self.http.timeout_secs = timeout;
        self
    }

    /// Build the client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`](crate::Error::Config) if the endpoint or key is missing, the
    /// endpoint is not an http(s) URL, or the key cannot be sent as a header; and [`Error::Service`](crate::Error::Service) if the HTTP
    /// client cannot be built.
    pub fn build(self) -> Result<AzureOpenAIClient> {
        let endpoint = self
            .endpoint
            .map(|e| e.trim().trim_end_matches('/').to_string())
            .filter(|e| !e.is_empty())
            .ok_or_else(|| ConfigError::missing("endpoint"))?;
        if !(endpoint.starts_with("https://") || endpoint.starts_with("http://")) {
            return Err(ConfigError::invalid(format!(
                "endpoint is not an http(s) URL: {endpoint}"
            ))
            .into());
        }

        let api_key = self
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::missing("api key"))?;
        let mut api_key = HeaderValue::from_str(&api_key)
            .map_err(|_| ConfigError::invalid("api key is not a valid header value"))?;
        api_key.set_sensitive(true);
        let api_version = self
            .api_version
            .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());
        let http_client = self.http.build_client()?;

        Ok(AzureOpenAIClient {
            http_client,
            api_key,
            endpoint: endpoint.into(),
            api_version: api_version.into(),
        })
    }
}
