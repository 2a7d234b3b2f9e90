//! Error types for ontcheck.
//!
//! - [`Error`] is what [`Classifier::classify`](crate::Classifier::classify)
//!   and the encoding/prompt functions return.
//! - [`ServiceError`] describes a failed or unusable call to the remote model.
//! - [`ConfigError`] is raised while assembling a [`ClassifierConfig`](crate::ClassifierConfig).

use std::fmt;
use std::path::PathBuf;

/// Result type alias for ontcheck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for ontcheck.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An image path does not resolve to a regular file.
    #[error("image not found: {}", path.display())]
    NotFound {
        /// The path that was looked up.
        path: PathBuf,
    },

    /// The image exists but could not be read.
    #[error("failed to read image {}: {source}", path.display())]
    Read {
        /// The path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The remote inference call failed or returned an unusable response.
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// Configuration could not be assembled.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl Error {
    /// Create a not found error for `path`.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    /// Returns `true` if this is a [`Error::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the service error, if this is one.
    #[must_use]
    pub const fn as_service(&self) -> Option<&ServiceError> {
        match self {
            Self::Service(err) => Some(err),
            _ => None,
        }
    }
}

/// Error type for remote inference calls.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ServiceError {
    /// The error kind.
    pub kind: ServiceErrorKind,
    /// The provider name (e.g., "azure-openai").
    pub provider: Option<String>,
    /// Additional error message.
    pub message: String,
    /// Optional error code from the provider or the HTTP status.
    pub code: Option<String>,
}

/// Categories of service errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ServiceErrorKind {
    /// Authentication or authorization failure.
    Auth,
    /// Rate limit or quota exceeded.
    RateLimited,
    /// Network or connection error.
    Network,
    /// Non-success HTTP status not covered by a more specific kind.
    HttpStatus,
    /// Malformed or unusable response body.
    ResponseFormat,
    /// Provider-specific error reported in the response body.
    Provider,
    /// The HTTP client could not be constructed.
    Client,
}

impl ServiceError {
    fn new(kind: ServiceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            provider: None,
            message: message.into(),
            code: None,
        }
    }

    /// Create an authentication error.
    #[must_use]
    pub fn auth(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Auth, message).with_provider(provider)
    }

    /// Create a rate limit error.
    #[must_use]
    pub fn rate_limited(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::RateLimited, message).with_provider(provider)
    }

    /// Create a network error.
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Network, message)
    }

    /// Create an HTTP status error.
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            code: Some(status.to_string()),
            ..Self::new(ServiceErrorKind::HttpStatus, format!("HTTP {status}: {}", body.into()))
        }
    }

    /// Create a response format error.
    #[must_use]
    pub fn response_format(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::ResponseFormat, message)
    }

    /// Create a provider error with an error code.
    #[must_use]
    pub fn provider_code(
        provider: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code: Some(code.into()),
            ..Self::new(ServiceErrorKind::Provider, message).with_provider(provider)
        }
    }

    /// Create an HTTP client construction error.
    #[must_use]
    pub fn client(message: impl Into<String>) -> Self {
        Self::new(ServiceErrorKind::Client, message)
    }

    /// Attach the provider name.
    #[must_use]
    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Attach an error code.
    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{provider}] ")?;
        }
        write!(f, "{}", self.message)?;
        if let Some(code) = &self.code {
            write!(f, " (code: {code})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::network("Request timed out")
        } else if err.is_connect() {
            Self::network(format!("Connection failed: {err}"))
        } else if err.is_decode() {
            Self::response_format(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

/// Error type for configuration assembly.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A required key is absent or blank.
    #[error("missing: {0}")]
    Missing(String),

    /// A value is present but unusable.
    #[error("invalid: {0}")]
    Invalid(String),

    /// A secrets file could not be read.
    #[error("io: {}: {source}", path.display())]
    Io {
        /// The secrets file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A JSON secrets file could not be parsed.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// A TOML secrets file could not be parsed.
    #[error("toml: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ConfigError {
    /// Create a missing key error.
    #[inline]
    pub fn missing(key: impl Into<String>) -> Self {
        Self::Missing(key.into())
    }

    /// Create an invalid value error.
    #[inline]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}
