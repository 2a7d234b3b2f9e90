//! Classifier configuration and secret lookup.
//!
//! Credentials are never read from inside the classifier. A caller collects
//! them from a [`SecretSource`] into a [`ClassifierConfig`] and hands that to
//! [`Classifier::from_config`](crate::Classifier::from_config).
//!
//! # Example
//!
//! ```rust,ignore
//! use ontcheck::config::{ClassifierConfig, EnvSecrets, SecretsFile};
//!
//! let file = SecretsFile::load(".streamlit/secrets.toml")?;
//! let config = ClassifierConfig::from_secrets(&(file, EnvSecrets))?
//!     .with_max_tokens(1500);
//! ```

use crate::error::ConfigError;
use crate::prompt::{DEFAULT_MAX_TOKENS, Exemplars, PromptBuilder, PromptLocale};
use crate::providers::azure::DEFAULT_API_VERSION;
use crate::providers::DEFAULT_TIMEOUT_SECS;
use std::collections::HashMap;
use std::path::Path;

/// Secret holding the Azure resource endpoint.
pub const ENDPOINT_KEY: &str = "AZURE_OAI_ENDPOINT";
/// Secret holding the Azure API key.
pub const API_KEY_KEY: &str = "AZURE_OAI_KEY";
/// Secret holding the deployment name.
pub const DEPLOYMENT_KEY: &str = "AZURE_OAI_DEPLOYMENT";
/// Optional secret overriding the API version.
pub const API_VERSION_KEY: &str = "AZURE_OAI_API_VERSION";

/// A read-only lookup of named secrets.
///
/// Implementations return `None` for keys that are absent or blank.
pub trait SecretSource {
    /// Look up `key`.
    fn secret(&self, key: &str) -> Option<String>;
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Secrets from the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSecrets;

impl SecretSource for EnvSecrets {
    fn secret(&self, key: &str) -> Option<String> {
        non_blank(std::env::var(key).ok())
    }
}

impl SecretSource for HashMap<String, String> {
    fn secret(&self, key: &str) -> Option<String> {
        non_blank(self.get(key).cloned())
    }
}

impl<S: SecretSource + ?Sized> SecretSource for &S {
    fn secret(&self, key: &str) -> Option<String> {
        (**self).secret(key)
    }
}

impl<S: SecretSource> SecretSource for Option<S> {
    fn secret(&self, key: &str) -> Option<String> {
        self.as_ref().and_then(|s| s.secret(key))
    }
}

/// `(first, second)` looks in `first`, then in `second`.
impl<A: SecretSource, B: SecretSource> SecretSource for (A, B) {
    fn secret(&self, key: &str) -> Option<String> {
        self.0.secret(key).or_else(|| self.1.secret(key))
    }
}

/// Secrets loaded from a flat file of top-level keys.
///
/// Files ending in `.json` are parsed as a JSON object; anything else as
/// TOML. String, integer, float and boolean values are kept; tables, arrays
/// and nulls are ignored.
#[derive(Clone, Default)]
pub struct SecretsFile {
    values: HashMap<String, String>,
}

impl std::fmt::Debug for SecretsFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.values.keys().collect();
        keys.sort();
        f.debug_struct("SecretsFile").field("keys", &keys).finish()
    }
}

impl SecretsFile {
    /// Read and parse the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Json`]/[`ConfigError::Toml`] if it cannot be parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_toml(&contents)
        }
    }

    /// Parse TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Toml`] on a syntax error.
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = contents.parse()?;
        let values = table
            .into_iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    toml::Value::String(s) => s,
                    toml::Value::Integer(i) => i.to_string(),
                    toml::Value::Float(f) => f.to_string(),
                    toml::Value::Boolean(b) => b.to_string(),
                    _ => return None,
                };
                Some((key, value))
            })
            .collect();
        Ok(Self { values })
    }

    /// Parse a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the text is not a JSON object.
    pub fn from_json(contents: &str) -> Result<Self, ConfigError> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(contents)?;
        let values = object
            .into_iter()
            .filter_map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some((key, value))
            })
            .collect();
        Ok(Self { values })
    }

    /// Number of usable keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the file held no usable keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl SecretSource for SecretsFile {
    fn secret(&self, key: &str) -> Option<String> {
        self.values.secret(key)
    }
}

/// Everything needed to construct a production [`Classifier`](crate::Classifier).
#[derive(Clone, PartialEq, Eq)]
pub struct ClassifierConfig {
    /// Azure resource endpoint, e.g. `https://name.openai.azure.com`.
    pub endpoint: String,
    /// Azure API key.
    pub api_key: String,
    /// Deployment name; also sent as the request's `model`.
    pub deployment: String,
    /// `api-version` query value.
    pub api_version: String,
    /// Ceiling on generated tokens.
    pub max_tokens: u32,
    /// Reference image paths.
    pub exemplars: Exemplars,
    /// Prompt language.
    pub locale: PromptLocale,
    /// HTTP request timeout; `None` disables it.
    pub timeout_secs: Option<u64>,
}

impl std::fmt::Debug for ClassifierConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[REDACTED]")
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("max_tokens", &self.max_tokens)
            .field("exemplars", &self.exemplars)
            .field("locale", &self.locale)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClassifierConfig {
    /// Create a config with default API version, limits, exemplars and locale.
    #[must_use]
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        deployment: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            deployment: deployment.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            exemplars: Exemplars::default(),
            locale: PromptLocale::default(),
            timeout_secs: Some(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Read endpoint, key and deployment (and optionally the API version)
    /// from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the first required key that is
    /// absent or blank.
    pub fn from_secrets(source: &impl SecretSource) -> Result<Self, ConfigError> {
        let require = |key: &str| source.secret(key).ok_or_else(|| ConfigError::missing(key));

        let endpoint = require(ENDPOINT_KEY)?;
        let api_key = require(API_KEY_KEY)?;
        let deployment = require(DEPLOYMENT_KEY)?;

        let mut config = Self::new(endpoint, api_key, deployment);
        if let Some(version) = source.secret(API_VERSION_KEY) {
            config.api_version = version;
        }
        Ok(config)
    }

    /// Set the API version.
    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Set the ceiling on generated tokens.
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the reference images.
    #[must_use]
    pub fn with_exemplars(mut self, exemplars: Exemplars) -> Self {
        self.exemplars = exemplars;
        self
    }

    /// Set the prompt language.
    #[must_use]
    pub const fn with_locale(mut self, locale: PromptLocale) -> Self {
        self.locale = locale;
        self
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout_secs(mut self, timeout_secs: Option<u64>) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// A prompt builder carrying this config's locale and token ceiling.
    #[must_use]
    pub fn prompt_builder(&self) -> PromptBuilder {
        PromptBuilder::new()
            .with_locale(self.locale)
            .with_max_tokens(self.max_tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    fn map(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    fn full() -> HashMap<String, String> {
        map(&[
            (ENDPOINT_KEY, "https://unit.openai.azure.com"),
            (API_KEY_KEY, "secret-key"),
            (DEPLOYMENT_KEY, "gpt-4o"),
        ])
    }

    #[test]
    fn test_from_secrets_defaults() {
        let config = ClassifierConfig::from_secrets(&full()).unwrap();
        assert_eq!(config.endpoint, "https://unit.openai.azure.com");
        assert_eq!(config.api_key, "secret-key");
        assert_eq!(config.deployment, "gpt-4o");
        assert_eq!(config.api_version, "2024-02-15-preview");
        assert_eq!(config.max_tokens, 2000);
        assert_eq!(config.exemplars, Exemplars::default());
        assert_eq!(config.locale, PromptLocale::English);
        assert_eq!(config.timeout_secs, Some(120));
    }

    #[test]
    fn test_from_secrets_missing_key() {
        let mut secrets = full();
        secrets.remove(API_KEY_KEY);
        let err = ClassifierConfig::from_secrets(&secrets).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref k) if k == API_KEY_KEY));

        let mut secrets = full();
        secrets.insert(DEPLOYMENT_KEY.to_string(), "  ".to_string());
        let err = ClassifierConfig::from_secrets(&secrets).unwrap_err();
        assert!(matches!(err, ConfigError::Missing(ref k) if k == DEPLOYMENT_KEY));
    }

    #[test]
    fn test_api_version_override() {
        let mut secrets = full();
        secrets.insert(API_VERSION_KEY.to_string(), "2024-06-01".to_string());
        let config = ClassifierConfig::from_secrets(&secrets).unwrap();
        assert_eq!(config.api_version, "2024-06-01");
    }

    #[test]
    fn test_chained_sources() {
        let first = map(&[(API_KEY_KEY, "from-first"), (DEPLOYMENT_KEY, "")]);
        let second = full();
        let chain = (&first, &second);

        assert_eq!(chain.secret(API_KEY_KEY).as_deref(), Some("from-first"));
        // blank in the first source falls through
        assert_eq!(chain.secret(DEPLOYMENT_KEY).as_deref(), Some("gpt-4o"));
        assert_eq!(chain.secret("UNSET"), None);

        let none: Option<SecretsFile> = None;
        assert_eq!(
            (none, &second).secret(ENDPOINT_KEY).as_deref(),
            Some("https://unit.openai.azure.com")
        );
    }

    #[test]
    fn test_env_secrets_absent() {
        assert_eq!(EnvSecrets.secret("ONTCHECK_TEST_KEY_THAT_IS_NEVER_SET"), None);
    }

    #[test]
    fn test_secrets_file_toml() {
        let temp = TempDir::new().unwrap();
        let file = temp.child("secrets.toml");
        file.write_str(
            "AZURE_OAI_ENDPOINT = \"https://unit.openai.azure.com\"\n\
             AZURE_OAI_KEY = \"secret-key\"\n\
             AZURE_OAI_DEPLOYMENT = \"gpt-4o\"\n\
             RETRIES = 3\n\
             [section]\n\
             nested = \"ignored\"\n",
        )
        .unwrap();

        let secrets = SecretsFile::load(file.path()).unwrap();
        assert_eq!(secrets.len(), 4);
        assert_eq!(secrets.secret("RETRIES").as_deref(), Some("3"));
        assert_eq!(secrets.secret("nested"), None);

        let config = ClassifierConfig::from_secrets(&secrets).unwrap();
        assert_eq!(config.deployment, "gpt-4o");
    }

    #[test]
    fn test_secrets_file_json() {
        let temp = TempDir::new().unwrap();
        let file = temp.child("secrets.JSON");
        file.write_str(r#"{"AZURE_OAI_KEY": "k", "flag": true, "list": [1]}"#)
            .unwrap();

        let secrets = SecretsFile::load(file.path()).unwrap();
        assert_eq!(secrets.secret(API_KEY_KEY).as_deref(), Some("k"));
        assert_eq!(secrets.secret("flag").as_deref(), Some("true"));
        assert_eq!(secrets.secret("list"), None);
    }

    #[test]
    fn test_secrets_file_errors() {
        let temp = TempDir::new().unwrap();
        let err = SecretsFile::load(temp.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));

        let bad_toml = temp.child("bad.toml");
        bad_toml.write_str("not = [valid").unwrap();
        assert!(matches!(
            SecretsFile::load(bad_toml.path()).unwrap_err(),
            ConfigError::Toml(_)
        ));

        let bad_json = temp.child("bad.json");
        bad_json.write_str("[1, 2]").unwrap();
        assert!(matches!(
            SecretsFile::load(bad_json.path()).unwrap_err(),
            ConfigError::Json(_)
        ));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = ClassifierConfig::from_secrets(&full()).unwrap();
        let debug = format!("{config:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("secret-key"));

        let secrets = SecretsFile::from_toml("AZURE_OAI_KEY = \"secret-key\"").unwrap();
        assert!(!format!("{secrets:?}").contains("secret-key"));
    }

    #[test]
    fn test_setters_and_prompt_builder() {
        let config = ClassifierConfig::new("https://e", "k", "d")
            .with_api_version("v")
            .with_max_tokens(256)
            .with_exemplars(Exemplars::new("g.png", "b.png"))
            .with_locale(PromptLocale::Spanish)
            .with_timeout_secs(None);

        assert_eq!(config.api_version, "v");
        assert_eq!(config.exemplars.good, Path::new("g.png"));
        assert_eq!(config.timeout_secs, None);

        let builder = config.prompt_builder();
        assert_eq!(builder.max_tokens(), 256);
        assert_eq!(builder.locale(), PromptLocale::Spanish);
    }
}
