//! HTTP client configuration for model providers.

use crate::error::ServiceError;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Shared HTTP client configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpClientConfig {
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// User agent string.
    pub user_agent: Option<String>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
            user_agent: Some(concat!("ontcheck/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

impl HttpClientConfig {
    /// Build a reqwest client with this configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ServiceError`] of kind `Client` if the TLS backend or
    /// resolver cannot be initialized.
    pub fn build_client(&self) -> Result<reqwest::Client, ServiceError> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = self.timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(timeout));
        }

        if let Some(ref user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        builder
            .build()
            .map_err(|e| ServiceError::client(format!("failed to build HTTP client: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_client_config_default() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout_secs, Some(120));
        assert!(
            config
                .user_agent
                .as_deref()
                .is_some_and(|ua| ua.starts_with("ontcheck/"))
        );
    }

    #[test]
    fn test_build_client() {
        let config = HttpClientConfig {
            timeout_secs: None,
            user_agent: None,
        };
        assert!(config.build_client().is_ok());
    }
}
